//! Growth parameters shared by every plant of one generation.
//!
//! A [`ParameterSet`] is plain data: the control panel edits a copy, and a
//! validated copy is handed to [`crate::garden::Garden`] before the next
//! regeneration. Presets are stored as TOML; missing fields fall back to the
//! defaults below.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::{
    f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU},
    ops::RangeInclusive,
    path::Path,
};

/// Most stem segments a plant may grow.
pub const MAX_STEM_SEGMENTS: u32 = 40;
/// Deepest branching level.
pub const MAX_BRANCH_DEPTH: u32 = 10;
/// Most plants in one generation.
pub const MAX_PLANTS: usize = 50;

pub const STEM_LEN_RANGE: RangeInclusive<f32> = 0.1..=15.0;
pub const STEM_RADIUS_RANGE: RangeInclusive<f32> = 0.1..=3.0;
/// Per-segment curvature of stems and forks.
pub const CURVE_RANGE: RangeInclusive<f32> = 0.0..=FRAC_PI_4;
/// Branch length and radius factors relative to the stem.
pub const BRANCH_FACTOR_RANGE: RangeInclusive<f32> = 0.1..=1.0;
pub const BRANCH_START_ANGLE_RANGE: RangeInclusive<f32> = 0.0..=FRAC_PI_2;
pub const FLOWER_LEN_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const FLOWER_ANGLE_RANGE: RangeInclusive<f32> = 0.1..=TAU;

/// Shaping of the main stem lineage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StemParams {
    pub min_segments: u32,
    pub max_segments: u32,
    pub start_len: f32,
    pub end_len: f32,
    pub start_radius: f32,
    pub end_radius: f32,
    /// Magnitude of the per-segment curvature, radians.
    pub angle: f32,
}

impl Default for StemParams {
    fn default() -> Self {
        Self {
            min_segments: 3,
            max_segments: 18,
            start_len: 8.0,
            end_len: 0.6,
            start_radius: 0.3,
            end_radius: 2.5,
            angle: 0.25,
        }
    }
}

impl StemParams {
    /// Number of interpolation steps between the start and end values.
    fn steps(&self) -> f32 {
        self.max_segments.saturating_sub(1) as f32
    }

    /// Length added by each stem continuation.
    pub fn len_step(&self) -> f32 {
        let steps = self.steps();
        if steps > 0.0 {
            (self.end_len - self.start_len) / steps
        } else {
            0.0
        }
    }

    /// Radius added by each stem continuation.
    pub fn radius_step(&self) -> f32 {
        let steps = self.steps();
        if steps > 0.0 {
            (self.end_radius - self.start_radius) / steps
        } else {
            0.0
        }
    }
}

/// Shaping of the side branches.
///
/// `start_len` / `start_radius` are factors applied to the originating stem
/// segment when a first-level branch sprouts; `end_len` / `end_radius` are
/// the factors reached after `max_depth` levels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchParams {
    pub max_depth: u32,
    pub chance: f32,
    pub double_chance: f32,
    pub start_len: f32,
    pub end_len: f32,
    pub start_radius: f32,
    pub end_radius: f32,
    pub start_angle: f32,
    pub angle: f32,
}

impl Default for BranchParams {
    fn default() -> Self {
        Self {
            max_depth: 3,
            chance: 0.65,
            double_chance: 0.5,
            start_len: 0.8,
            end_len: 0.5,
            start_radius: 0.3,
            end_radius: 0.1,
            start_angle: 0.7,
            angle: 0.3,
        }
    }
}

/// Shaping of the petal crowns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowerParams {
    pub chance: f32,
    pub start_len: f32,
    pub end_len: f32,
    pub start_angle: f32,
    pub end_angle: f32,
}

impl Default for FlowerParams {
    fn default() -> Self {
        Self {
            chance: 1.0,
            start_len: 2.0,
            end_len: 6.0,
            start_angle: 1.0,
            end_angle: 4.0,
        }
    }
}

/// How many plants to grow and over how wide a square.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantingParams {
    pub count: usize,
    /// Side length of the planting square centred on the origin.
    pub range: f32,
}

impl Default for PlantingParams {
    fn default() -> Self {
        Self {
            count: 20,
            range: 200.0,
        }
    }
}

/// Complete parameter set for one generation of plants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub stem: StemParams,
    pub branch: BranchParams,
    pub flower: FlowerParams,
    pub planting: PlantingParams,
}

impl ParameterSet {
    /// Assembles and validates a parameter set.
    pub fn new(
        stem: StemParams,
        branch: BranchParams,
        flower: FlowerParams,
        planting: PlantingParams,
    ) -> Result<Self, ConfigError> {
        let params = Self {
            stem,
            branch,
            flower,
            planting,
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks the caller contract.
    ///
    /// Degenerate shapes (zero depth, an empty planting) pass: growth skips
    /// them. Empty segment ranges, out-of-range chances, non-finite numbers
    /// and shape values outside the ranges above do not.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stem = &self.stem;
        if stem.min_segments == 0 || stem.min_segments > stem.max_segments {
            return Err(ConfigError::SegmentRange {
                min: stem.min_segments,
                max: stem.max_segments,
            });
        }

        let finite = [
            ("stem.start_len", stem.start_len),
            ("stem.end_len", stem.end_len),
            ("stem.start_radius", stem.start_radius),
            ("stem.end_radius", stem.end_radius),
            ("stem.angle", stem.angle),
            ("branch.start_len", self.branch.start_len),
            ("branch.end_len", self.branch.end_len),
            ("branch.start_radius", self.branch.start_radius),
            ("branch.end_radius", self.branch.end_radius),
            ("branch.start_angle", self.branch.start_angle),
            ("branch.angle", self.branch.angle),
            ("flower.start_len", self.flower.start_len),
            ("flower.end_len", self.flower.end_len),
            ("flower.start_angle", self.flower.start_angle),
            ("flower.end_angle", self.flower.end_angle),
            ("planting.range", self.planting.range),
        ];
        if let Some((name, _)) = finite.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::NonFinite { name });
        }

        let chances = [
            ("branch.chance", self.branch.chance),
            ("branch.double_chance", self.branch.double_chance),
            ("flower.chance", self.flower.chance),
        ];
        for (name, value) in chances {
            // Written so that NaN fails as well.
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { name, value });
            }
        }

        if self.planting.range < 0.0 {
            return Err(ConfigError::Negative {
                name: "planting.range",
                value: self.planting.range,
            });
        }

        let branch = &self.branch;
        let flower = &self.flower;
        let shapes = [
            ("stem.start_len", stem.start_len, STEM_LEN_RANGE),
            ("stem.end_len", stem.end_len, STEM_LEN_RANGE),
            ("stem.start_radius", stem.start_radius, STEM_RADIUS_RANGE),
            ("stem.end_radius", stem.end_radius, STEM_RADIUS_RANGE),
            ("stem.angle", stem.angle, CURVE_RANGE),
            ("branch.start_len", branch.start_len, BRANCH_FACTOR_RANGE),
            ("branch.end_len", branch.end_len, BRANCH_FACTOR_RANGE),
            ("branch.start_radius", branch.start_radius, BRANCH_FACTOR_RANGE),
            ("branch.end_radius", branch.end_radius, BRANCH_FACTOR_RANGE),
            ("branch.start_angle", branch.start_angle, BRANCH_START_ANGLE_RANGE),
            ("branch.angle", branch.angle, CURVE_RANGE),
            ("flower.start_len", flower.start_len, FLOWER_LEN_RANGE),
            ("flower.end_len", flower.end_len, FLOWER_LEN_RANGE),
            ("flower.start_angle", flower.start_angle, FLOWER_ANGLE_RANGE),
            ("flower.end_angle", flower.end_angle, FLOWER_ANGLE_RANGE),
        ];
        for (name, value, range) in shapes {
            if !range.contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value,
                    min: *range.start(),
                    max: *range.end(),
                });
            }
        }

        let limits = [
            ("stem.max_segments", stem.max_segments as usize, MAX_STEM_SEGMENTS as usize),
            ("branch.max_depth", branch.max_depth as usize, MAX_BRANCH_DEPTH as usize),
            ("planting.count", self.planting.count, MAX_PLANTS),
        ];
        if let Some((name, value, max)) = limits.into_iter().find(|(_, v, max)| v > max) {
            return Err(ConfigError::TooLarge { name, value, max });
        }

        Ok(())
    }

    /// Parses and validates a TOML preset.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Writes the parameter set as a TOML preset.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

/// Reads a preset file from disk.
pub fn load_params(path: &Path) -> Result<ParameterSet, ConfigError> {
    let toml_str = std::fs::read_to_string(path)?;
    let params = ParameterSet::from_toml_str(&toml_str)?;
    tracing::info!("read plant parameters from {}", path.display());
    Ok(params)
}
