use crate::{
    flower::FlowerGeometry,
    types::{PlantId, SegmentId},
};
use glam::Vec3;

/// Smallest length or radius a segment may have.
pub const MIN_EXTENT: f32 = 1e-3;

/// One tubular element of a plant.
///
/// Shape (`angle`, `length`, `radius`, flower geometry) is fixed at growth
/// time; pose (`position`, `rotation`) and the two force accumulators are
/// rewritten by the wind field every frame.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Rest rotation, accumulated from the root through every ancestor.
    pub angle: f32,
    pub length: f32,
    pub radius: f32,
    pub position: Vec3,
    pub rotation: f32,
    pub is_stem: bool,
    pub is_flower: bool,
    pub is_finished: bool,
    pub depth: u32,
    /// Stem segment this branch sprouted from. `None` for stems.
    pub parent_stem: Option<SegmentId>,
    /// Geometric parent. `None` for the root.
    pub parent: Option<SegmentId>,
    pub wind_force: f32,
    pub blast_force: f32,
    pub flower: Option<FlowerGeometry>,
}

/// Which lineage a newly grown segment continues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lineage {
    Stem,
    Branch { parent_stem: SegmentId },
}

/// Increments applied to a parent segment to derive a child.
#[derive(Clone, Copy, Debug)]
pub struct Growth {
    pub angle_inc: f32,
    pub len_inc: f32,
    pub radius_inc: f32,
    pub lineage: Lineage,
}

impl Segment {
    pub fn new_root(position: Vec3, angle: f32, length: f32, radius: f32) -> Self {
        Self {
            angle,
            length: length.max(MIN_EXTENT),
            radius: radius.max(MIN_EXTENT),
            position,
            rotation: angle,
            is_stem: true,
            is_flower: false,
            is_finished: false,
            depth: 0,
            parent_stem: None,
            parent: None,
            wind_force: 0.0,
            blast_force: 0.0,
            flower: None,
        }
    }

    pub fn new_child(parent_id: SegmentId, parent: &Segment, growth: Growth) -> Self {
        let angle = parent.angle + growth.angle_inc;
        let (is_stem, parent_stem, depth) = match growth.lineage {
            Lineage::Stem => (true, None, parent.depth),
            Lineage::Branch { parent_stem } => (false, Some(parent_stem), parent.depth + 1),
        };

        Self {
            angle,
            length: (parent.length + growth.len_inc).max(MIN_EXTENT),
            radius: (parent.radius + growth.radius_inc).max(MIN_EXTENT),
            position: parent.tip(),
            rotation: angle,
            is_stem,
            is_flower: false,
            is_finished: false,
            depth,
            parent_stem,
            parent: Some(parent_id),
            wind_force: 0.0,
            blast_force: 0.0,
            flower: None,
        }
    }

    /// Far end of the segment in its current pose.
    #[inline]
    pub fn tip(&self) -> Vec3 {
        self.position + Vec3::new(self.rotation.cos(), 0.0, self.rotation.sin()) * self.length
    }

    /// Tessellation hint for the capsule body: polygons around each cap.
    pub fn resolution(&self) -> u32 {
        ((self.radius * 5.0).round() as u32).max(3)
    }

    pub fn pose(&self, plant: PlantId, segment: SegmentId) -> SegmentPose<'_> {
        SegmentPose {
            plant,
            segment,
            position: self.position,
            rotation: self.rotation,
            length: self.length,
            radius: self.radius,
            resolution: self.resolution(),
            is_flower: self.is_flower,
            flower: self.flower.as_ref(),
        }
    }
}

/// Per-frame view of a segment handed to the renderer.
///
/// `(plant, segment)` is stable for the lifetime of one generation, and
/// everything except `position` / `rotation` is constant over it, so the
/// renderer may cache meshes keyed on it.
#[derive(Clone, Copy, Debug)]
pub struct SegmentPose<'a> {
    pub plant: PlantId,
    pub segment: SegmentId,
    pub position: Vec3,
    pub rotation: f32,
    pub length: f32,
    pub radius: f32,
    pub resolution: u32,
    pub is_flower: bool,
    pub flower: Option<&'a FlowerGeometry>,
}

/// All segments of one plant in creation order.
///
/// Every segment's parent is stored before it, so a front-to-back walk
/// visits parents first.
#[derive(Debug, Clone)]
pub struct Plant {
    pub segments: Vec<Segment>,
}

impl Plant {
    pub fn new(root: Segment) -> Self {
        Self {
            segments: vec![root],
        }
    }

    pub fn root(&self) -> &Segment {
        &self.segments[0]
    }

    /// Appends a child of `parent` and returns its id.
    pub fn grow(&mut self, parent: SegmentId, growth: Growth) -> SegmentId {
        let id = self.segments.len();
        let child = Segment::new_child(parent, &self.segments[parent], growth);
        self.segments.push(child);
        id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn flower_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_flower).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stem_growth(angle_inc: f32) -> Growth {
        Growth {
            angle_inc,
            len_inc: -1.0,
            radius_inc: 0.5,
            lineage: Lineage::Stem,
        }
    }

    #[test]
    fn root_has_no_parents() {
        let plant = Plant::new(Segment::new_root(Vec3::new(3.0, 0.0, -2.0), 0.25, 8.0, 0.3));
        let root = plant.root();
        assert!(root.is_stem);
        assert_eq!(root.depth, 0);
        assert!(root.parent.is_none());
        assert!(root.parent_stem.is_none());
        assert_eq!(root.rotation, root.angle);
    }

    #[test]
    fn stem_child_starts_at_parent_tip() {
        let mut plant = Plant::new(Segment::new_root(Vec3::ZERO, 0.0, 8.0, 0.3));
        let id = plant.grow(0, stem_growth(0.25));
        assert_eq!(id, 1);

        let child = &plant.segments[id];
        assert_eq!(child.parent, Some(0));
        assert!(child.is_stem);
        assert!(child.parent_stem.is_none());
        assert_eq!(child.depth, 0);
        assert_eq!(child.angle, 0.25);
        assert_eq!(child.length, 7.0);
        assert!((child.radius - 0.8).abs() < 1e-6);
        assert_eq!(child.position, Vec3::new(8.0, 0.0, 0.0));
    }

    #[test]
    fn branch_child_deepens_and_remembers_stem() {
        let mut plant = Plant::new(Segment::new_root(Vec3::ZERO, 0.0, 8.0, 0.3));
        let b1 = plant.grow(
            0,
            Growth {
                angle_inc: 0.7,
                len_inc: 0.0,
                radius_inc: 0.0,
                lineage: Lineage::Branch { parent_stem: 0 },
            },
        );
        let b2 = plant.grow(
            b1,
            Growth {
                angle_inc: -0.3,
                len_inc: 0.0,
                radius_inc: 0.0,
                lineage: Lineage::Branch { parent_stem: 0 },
            },
        );

        assert_eq!(plant.segments[b1].depth, 1);
        assert_eq!(plant.segments[b2].depth, 2);
        assert_eq!(plant.segments[b2].parent, Some(b1));
        assert_eq!(plant.segments[b2].parent_stem, Some(0));
        assert!(!plant.segments[b2].is_stem);
        assert!((plant.segments[b2].angle - 0.4).abs() < 1e-6);
    }

    #[test]
    fn extents_never_drop_below_floor() {
        let mut plant = Plant::new(Segment::new_root(Vec3::ZERO, 0.0, 1.0, 0.2));
        let id = plant.grow(
            0,
            Growth {
                angle_inc: 0.0,
                len_inc: -5.0,
                radius_inc: -5.0,
                lineage: Lineage::Stem,
            },
        );
        assert_eq!(plant.segments[id].length, MIN_EXTENT);
        assert_eq!(plant.segments[id].radius, MIN_EXTENT);

        let root = Segment::new_root(Vec3::ZERO, 0.0, -1.0, 0.0);
        assert_eq!(root.length, MIN_EXTENT);
        assert_eq!(root.radius, MIN_EXTENT);
    }

    #[test]
    fn resolution_has_a_floor_of_three() {
        let thin = Segment::new_root(Vec3::ZERO, 0.0, 1.0, 0.1);
        let thick = Segment::new_root(Vec3::ZERO, 0.0, 1.0, 2.5);
        assert_eq!(thin.resolution(), 3);
        assert_eq!(thick.resolution(), 13);
    }

    #[test]
    fn pose_reports_identity_and_shape() {
        let mut plant = Plant::new(Segment::new_root(Vec3::ZERO, 0.0, 2.0, 1.0));
        let id = plant.grow(0, stem_growth(0.1));
        let pose = plant.segments[id].pose(4, id);
        assert_eq!(pose.plant, 4);
        assert_eq!(pose.segment, id);
        assert_eq!(pose.length, 1.0);
        assert_eq!(pose.radius, 1.5);
        assert!(!pose.is_flower);
        assert!(pose.flower.is_none());
    }
}
