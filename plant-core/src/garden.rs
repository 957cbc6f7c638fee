//! The simulation entry point used by front ends.
//!
//! A [`Garden`] owns the current parameters, the plants grown from them,
//! the wind and the random generator. Front ends edit parameters through
//! [`Garden::set_params`], call [`Garden::regenerate`] to regrow, and call
//! [`Garden::step`] once per rendered frame before reading
//! [`Garden::poses`].

use crate::{
    collection::PlantCollection,
    config::ParameterSet,
    error::ConfigError,
    segment::SegmentPose,
    wind::{WindField, branch_factor},
};
use rand::{SeedableRng, rngs::StdRng};

#[derive(Debug)]
pub struct Garden {
    params: ParameterSet,
    plants: PlantCollection,
    wind: WindField,
    rng: StdRng,
    frame: u64,
}

impl Garden {
    /// Validates `params` and grows the first generation.
    ///
    /// The same `seed` and parameters always grow the same plants.
    pub fn new(params: ParameterSet, seed: u64) -> Result<Self, ConfigError> {
        params.validate()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let plants = PlantCollection::generate(&params, &mut rng);
        let wind = WindField::for_depth(params.branch.max_depth);
        tracing::debug!(
            seed,
            plants = plants.len(),
            segments = plants.segment_count(),
            flowers = plants.flower_count(),
            "planted garden"
        );

        Ok(Self {
            params,
            plants,
            wind,
            rng,
            frame: 0,
        })
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Replaces the parameters used by the next [`Garden::regenerate`].
    ///
    /// Invalid parameters are rejected and the current ones kept.
    pub fn set_params(&mut self, params: ParameterSet) -> Result<(), ConfigError> {
        params.validate()?;
        if params != self.params {
            tracing::info!("plant parameters changed");
        }
        self.params = params;
        Ok(())
    }

    /// Discards every plant and grows a new generation from the current
    /// parameters.
    pub fn regenerate(&mut self) {
        self.plants = PlantCollection::generate(&self.params, &mut self.rng);
        self.wind.set_branch_factor(branch_factor(self.params.branch.max_depth));
        tracing::debug!(
            plants = self.plants.len(),
            segments = self.plants.segment_count(),
            flowers = self.plants.flower_count(),
            "regenerated garden"
        );
    }

    /// Advances the wind by one frame.
    pub fn step(&mut self) {
        self.wind.advance(&mut self.plants.plants);
        self.frame += 1;
    }

    pub fn plants(&self) -> &PlantCollection {
        &self.plants
    }

    pub fn wind(&self) -> &WindField {
        &self.wind
    }

    /// Number of frames stepped since the garden was created.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Current pose of every segment.
    pub fn poses(&self) -> impl Iterator<Item = SegmentPose<'_>> + '_ {
        self.plants.poses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wind::WIND_STEP;

    fn small_params() -> ParameterSet {
        let mut params = ParameterSet::default();
        params.planting.count = 5;
        params
    }

    #[test]
    fn new_rejects_invalid_parameters() {
        let mut params = small_params();
        params.stem.min_segments = 10;
        params.stem.max_segments = 2;
        assert!(matches!(
            Garden::new(params, 1),
            Err(ConfigError::SegmentRange { .. })
        ));
    }

    #[test]
    fn same_seed_plants_the_same_garden() {
        let a = Garden::new(small_params(), 99).unwrap();
        let b = Garden::new(small_params(), 99).unwrap();
        let pa: Vec<_> = a.poses().map(|p| (p.position, p.length, p.radius)).collect();
        let pb: Vec<_> = b.poses().map(|p| (p.position, p.length, p.radius)).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn regenerate_replaces_the_whole_collection() {
        let mut garden = Garden::new(small_params(), 2).unwrap();
        assert_eq!(garden.plants().len(), 5);

        let mut params = small_params();
        params.planting.count = 2;
        params.branch.max_depth = 8;
        garden.set_params(params).unwrap();
        // Nothing changes until the next regeneration.
        assert_eq!(garden.plants().len(), 5);

        garden.regenerate();
        assert_eq!(garden.plants().len(), 2);
        assert_eq!(garden.wind().branch_factor(), branch_factor(8));
    }

    #[test]
    fn rejected_parameters_keep_the_old_ones() {
        let mut garden = Garden::new(small_params(), 3).unwrap();
        let mut params = small_params();
        params.branch.chance = -0.1;
        assert!(garden.set_params(params).is_err());
        assert_eq!(garden.params(), &small_params());
    }

    #[test]
    fn step_advances_wind_and_moves_segments() {
        let mut garden = Garden::new(small_params(), 4).unwrap();
        let before: Vec<f32> = garden.poses().map(|p| p.rotation).collect();

        for _ in 0..10 {
            garden.step();
        }
        assert_eq!(garden.frame(), 10);
        assert!((garden.wind().angle() - 10.0 * WIND_STEP).abs() < 1e-5);

        let after: Vec<f32> = garden.poses().map(|p| p.rotation).collect();
        assert_eq!(before.len(), after.len());
        assert!(before.iter().zip(&after).any(|(b, a)| b != a));
    }

    #[test]
    fn regenerating_keeps_the_wind_running() {
        let mut garden = Garden::new(small_params(), 5).unwrap();
        garden.step();
        garden.step();
        let angle = garden.wind().angle();
        garden.regenerate();
        assert_eq!(garden.wind().angle(), angle);
    }
}
