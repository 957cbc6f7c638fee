use crate::{
    config::ParameterSet,
    flower::RadiusRange,
    growth::GrowthEngine,
    segment::{Plant, SegmentPose},
};
use glam::Vec3;
use rand::Rng;

/// Draws a point on the ground plane (`y = 0`) inside the square
/// `[-half_range, half_range]²`.
pub fn random_in_square(half_range: f32, rng: &mut impl Rng) -> Vec3 {
    let x = rng.random_range(-half_range..=half_range);
    let z = rng.random_range(-half_range..=half_range);
    Vec3::new(x, 0.0, z)
}

/// Every plant of one generation.
///
/// Plants are grown independently and never replaced one by one; a new
/// generation replaces the whole collection.
#[derive(Debug)]
pub struct PlantCollection {
    pub plants: Vec<Plant>,
    radii: RadiusRange,
}

impl PlantCollection {
    /// Grows `params.planting.count` plants.
    ///
    /// The flower radius range starts out at the stem end radius and widens
    /// as flowers are placed, so plants grown later see a range that
    /// already covers the earlier ones.
    pub fn generate(params: &ParameterSet, rng: &mut impl Rng) -> Self {
        let engine = GrowthEngine::new(params);
        let mut radii = RadiusRange::seeded(params.stem.end_radius);

        let mut plants = Vec::with_capacity(params.planting.count);
        for _ in 0..params.planting.count {
            plants.push(engine.build(rng, &mut radii));
        }

        Self { plants, radii }
    }

    /// Flower radius range after the last plant was grown.
    pub fn radii(&self) -> RadiusRange {
        self.radii
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn segment_count(&self) -> usize {
        self.plants.iter().map(Plant::len).sum()
    }

    pub fn flower_count(&self) -> usize {
        self.plants.iter().map(Plant::flower_count).sum()
    }

    /// Current pose of every segment, plant by plant in creation order.
    pub fn poses(&self) -> impl Iterator<Item = SegmentPose<'_>> + '_ {
        self.plants.iter().enumerate().flat_map(|(plant_id, plant)| {
            plant
                .segments
                .iter()
                .enumerate()
                .map(move |(segment_id, segment)| segment.pose(plant_id, segment_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn random_in_square_stays_on_the_ground() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            let p = random_in_square(3.0, &mut rng);
            assert!(p.x >= -3.0 && p.x <= 3.0);
            assert!(p.z >= -3.0 && p.z <= 3.0);
            assert_eq!(p.y, 0.0);
        }
        assert_eq!(random_in_square(0.0, &mut rng), Vec3::ZERO);
    }

    #[test]
    fn generate_grows_requested_number_of_plants() {
        let mut params = ParameterSet::default();
        params.planting.count = 7;
        let mut rng = StdRng::seed_from_u64(1);

        let collection = PlantCollection::generate(&params, &mut rng);
        assert_eq!(collection.len(), 7);
        assert!(collection.segment_count() >= 7);
    }

    #[test]
    fn empty_planting_is_an_empty_collection() {
        let mut params = ParameterSet::default();
        params.planting.count = 0;
        let mut rng = StdRng::seed_from_u64(2);

        let collection = PlantCollection::generate(&params, &mut rng);
        assert!(collection.is_empty());
        assert_eq!(collection.poses().count(), 0);
    }

    #[test]
    fn radius_range_covers_every_flower() {
        let params = ParameterSet::default();
        let mut rng = StdRng::seed_from_u64(3);

        let collection = PlantCollection::generate(&params, &mut rng);
        let radii = collection.radii();
        assert!(radii.min() <= params.stem.end_radius);
        assert!(radii.max() >= params.stem.end_radius);
        for plant in &collection.plants {
            for segment in plant.segments.iter().filter(|s| s.is_flower) {
                assert!(segment.radius >= radii.min() && segment.radius <= radii.max());
            }
        }
    }

    #[test]
    fn poses_cover_every_segment_once() {
        let mut params = ParameterSet::default();
        params.planting.count = 4;
        let mut rng = StdRng::seed_from_u64(4);

        let collection = PlantCollection::generate(&params, &mut rng);
        let poses: Vec<_> = collection.poses().collect();
        assert_eq!(poses.len(), collection.segment_count());

        for pose in &poses {
            let segment = &collection.plants[pose.plant].segments[pose.segment];
            assert_eq!(pose.position, segment.position);
            assert_eq!(pose.is_flower, segment.is_flower);
            assert_eq!(pose.flower.is_some(), segment.flower.is_some());
        }
        let flowering = poses.iter().filter(|p| p.is_flower).count();
        assert_eq!(flowering, collection.flower_count());
    }
}
