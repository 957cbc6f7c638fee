//! Per-frame wind sway.
//!
//! A single wind angle advances every frame. Each plant's root is pushed by
//! a sinusoid of that angle and its own x position, so plants sway out of
//! phase. The push then propagates from parent to child: stems pass it on
//! unchanged, branches scale it by the branch factor. On top of that every
//! segment integrates a slow "blast" impulse of its own.

use crate::segment::Plant;

/// Wind angle advance per frame, radians.
pub const WIND_STEP: f32 = 0.045;
/// Frequency of the slow envelope modulating both forces.
const ENVELOPE_FREQ: f32 = 0.08;
/// Root sway amplitude.
const ROOT_AMPLITUDE: f32 = 0.06;
/// Bias keeping the root sway envelope mostly positive.
const ROOT_BIAS: f32 = 0.4;
/// Per-frame blast impulse amplitude.
const BLAST_AMPLITUDE: f32 = 0.004;

/// Deepest `max_depth` the branch factor mapping distinguishes.
const MAX_MAPPED_DEPTH: u32 = 10;

fn convert_range(value: f32, from_lo: f32, from_hi: f32, to_lo: f32, to_hi: f32) -> f32 {
    (value - from_lo) * (to_hi - to_lo) / (from_hi - from_lo) + to_lo
}

/// Wind amplification per branching level for a given `max_depth`.
///
/// Shallow plants amplify strongly (1.7 at depth 0), deep plants gently
/// (1.2 at depth 10 and beyond), keeping the sway at the tips comparable.
pub fn branch_factor(max_depth: u32) -> f32 {
    let depth = max_depth.min(MAX_MAPPED_DEPTH) as f32;
    convert_range(depth, 0.0, MAX_MAPPED_DEPTH as f32, 1.7, 1.2)
}

/// Global wind state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindField {
    angle: f32,
    branch_factor: f32,
}

impl WindField {
    pub fn new(branch_factor: f32) -> Self {
        Self {
            angle: 0.0,
            branch_factor,
        }
    }

    /// Wind field with the branch factor mapped from `max_depth`.
    pub fn for_depth(max_depth: u32) -> Self {
        Self::new(branch_factor(max_depth))
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn branch_factor(&self) -> f32 {
        self.branch_factor
    }

    /// Replaces the branch factor; the wind angle keeps running.
    pub fn set_branch_factor(&mut self, branch_factor: f32) {
        self.branch_factor = branch_factor;
    }

    /// Advances the wind by one frame and re-poses every plant.
    pub fn advance(&mut self, plants: &mut [Plant]) {
        self.angle += WIND_STEP;
        for plant in plants {
            self.sway(plant);
        }
    }

    /// Re-poses one plant for the current wind angle.
    ///
    /// Segments are visited in creation order, which puts every parent
    /// before its children, so each child reads its parent's pose from this
    /// same frame.
    pub fn sway(&self, plant: &mut Plant) {
        let a = self.angle;
        let envelope = (a * ENVELOPE_FREQ).sin();

        let Some(root) = plant.segments.first_mut() else {
            return;
        };
        root.wind_force = (root.position.x + a).sin() * ((ROOT_BIAS + envelope) * ROOT_AMPLITUDE);

        let blast_scale = envelope * BLAST_AMPLITUDE;
        for id in 0..plant.segments.len() {
            let parent = plant.segments[id].parent.map(|p| {
                let parent = &plant.segments[p];
                (parent.tip(), parent.wind_force)
            });

            let segment = &mut plant.segments[id];
            segment.blast_force += (segment.position.x + a).sin() * blast_scale;

            if let Some((tip, parent_wind)) = parent {
                segment.wind_force = if segment.is_stem {
                    parent_wind
                } else {
                    parent_wind * self.branch_factor
                };
                segment.position = tip;
            }

            segment.rotation = segment.angle + segment.wind_force + segment.blast_force;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ParameterSet,
        flower::RadiusRange,
        growth::build_plant,
        segment::{Growth, Lineage, Segment},
    };
    use glam::Vec3;
    use rand::{SeedableRng, rngs::StdRng};

    /// Root stem, a stem continuation and a branch off the root.
    fn small_plant() -> Plant {
        let mut plant = Plant::new(Segment::new_root(Vec3::new(1.5, 0.0, -2.0), 0.2, 4.0, 1.0));
        plant.grow(
            0,
            Growth {
                angle_inc: 0.1,
                len_inc: -0.5,
                radius_inc: 0.1,
                lineage: Lineage::Stem,
            },
        );
        plant.grow(
            0,
            Growth {
                angle_inc: 0.7,
                len_inc: -1.0,
                radius_inc: -0.5,
                lineage: Lineage::Branch { parent_stem: 0 },
            },
        );
        plant
    }

    #[test]
    fn branch_factor_maps_depth_linearly() {
        assert!((branch_factor(0) - 1.7).abs() < 1e-6);
        assert!((branch_factor(10) - 1.2).abs() < 1e-6);
        assert!((branch_factor(3) - 1.55).abs() < 1e-6);
        assert_eq!(branch_factor(25), branch_factor(10));
        for depth in 0..10 {
            assert!(branch_factor(depth + 1) < branch_factor(depth));
        }
    }

    #[test]
    fn advance_steps_the_wind_angle() {
        let mut wind = WindField::for_depth(3);
        let mut plants: Vec<Plant> = Vec::new();
        for _ in 0..10 {
            wind.advance(&mut plants);
        }
        assert!((wind.angle() - 10.0 * WIND_STEP).abs() < 1e-5);
    }

    #[test]
    fn root_force_follows_the_oscillator() {
        let mut wind = WindField::new(1.5);
        let mut plants = vec![small_plant()];
        wind.advance(&mut plants);

        let a = wind.angle();
        let root = plants[0].root();
        let expected = (1.5 + a).sin() * ((0.4 + (a * 0.08).sin()) * 0.06);
        assert_eq!(root.wind_force, expected);
        assert_eq!(root.position, Vec3::new(1.5, 0.0, -2.0));
    }

    #[test]
    fn children_sit_on_their_parents_tips() {
        let params = ParameterSet::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut radii = RadiusRange::seeded(params.stem.end_radius);
        let mut plants = vec![build_plant(&params, &mut rng, &mut radii)];
        let mut wind = WindField::for_depth(params.branch.max_depth);

        for _ in 0..3 {
            wind.advance(&mut plants);
            let plant = &plants[0];
            for segment in plant.segments.iter().skip(1) {
                let parent = &plant.segments[segment.parent.unwrap()];
                let expected = parent.position
                    + Vec3::new(parent.rotation.cos(), 0.0, parent.rotation.sin()) * parent.length;
                assert_eq!(segment.position, expected);
            }
        }
    }

    #[test]
    fn rotation_combines_rest_angle_and_forces() {
        let mut wind = WindField::new(1.3);
        let mut plants = vec![small_plant()];
        for _ in 0..5 {
            wind.advance(&mut plants);
        }
        for segment in &plants[0].segments {
            assert_eq!(
                segment.rotation,
                segment.angle + segment.wind_force + segment.blast_force
            );
        }
    }

    #[test]
    fn stems_pass_wind_through_and_branches_scale_it() {
        let mut wind = WindField::new(1.4);
        let mut plants = vec![small_plant()];
        wind.advance(&mut plants);

        let plant = &plants[0];
        let root = plant.segments[0].wind_force;
        assert_eq!(plant.segments[1].wind_force, root);
        assert_eq!(plant.segments[2].wind_force, root * 1.4);
    }

    #[test]
    fn weak_branch_factor_damps_branch_wind() {
        let mut wind = WindField::new(0.5);
        let mut plants = vec![small_plant()];
        for _ in 0..50 {
            wind.advance(&mut plants);
            let plant = &plants[0];
            let stem = plant.segments[0].wind_force.abs();
            let branch = plant.segments[2].wind_force.abs();
            assert!(branch <= stem);
        }
    }

    #[test]
    fn blast_force_accumulates_across_frames() {
        let mut wind = WindField::new(1.5);
        let mut plants = vec![small_plant()];
        let mut expected = 0.0f32;
        for _ in 0..20 {
            let x = plants[0].root().position.x;
            wind.advance(&mut plants);
            let a = wind.angle();
            expected += (x + a).sin() * ((a * 0.08).sin() * 0.004);
            assert!((plants[0].root().blast_force - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_plant_is_left_alone() {
        let wind = WindField::new(1.5);
        let mut plant = Plant {
            segments: Vec::new(),
        };
        wind.sway(&mut plant);
        assert!(plant.is_empty());
    }
}
