//! Error types for parameter validation and preset loading.

use thiserror::Error;

/// Errors raised when a [`crate::config::ParameterSet`] is rejected.
///
/// Degenerate but well-formed parameters (zero depth, an empty planting) are not
/// errors; growth suppresses them silently. Only contract violations end up
/// here.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The stem segment range is empty or starts at zero.
    #[error("invalid stem segment range: min {min}, max {max}")]
    SegmentRange {
        /// Requested minimum number of stem segments.
        min: u32,
        /// Requested maximum number of stem segments.
        max: u32,
    },

    /// A chance parameter lies outside `[0, 1]`.
    #[error("{name} must be a probability in [0, 1], got {value}")]
    Probability {
        /// Dotted parameter name, e.g. `branch.chance`.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A numeric parameter is NaN or infinite.
    #[error("{name} must be finite")]
    NonFinite {
        /// Dotted parameter name.
        name: &'static str,
    },

    /// A parameter that must not be negative is.
    #[error("{name} must not be negative, got {value}")]
    Negative {
        /// Dotted parameter name.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// A shape parameter lies outside the range the growth model supports.
    #[error("{name} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        /// Dotted parameter name.
        name: &'static str,
        /// The rejected value.
        value: f32,
        /// Smallest accepted value.
        min: f32,
        /// Largest accepted value.
        max: f32,
    },

    /// A count or depth exceeds its limit.
    #[error("{name} must be at most {max}, got {value}")]
    TooLarge {
        /// Dotted parameter name.
        name: &'static str,
        /// The rejected value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },

    /// A preset could not be parsed.
    #[error("failed to parse parameter preset: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parameter set could not be written as a preset.
    #[error("failed to serialize parameter preset: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A preset file could not be read.
    #[error("failed to read parameter preset: {0}")]
    Io(#[from] std::io::Error),
}
