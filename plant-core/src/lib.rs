//! Procedural flowering plants swaying in the wind.
//!
//! Main components:
//! - [`config`] — the parameter set shaping stems, branches and flowers.
//! - [`segment`] — segments, plants, and the per-frame pose output.
//! - [`growth`] — round-based growth of one plant.
//! - [`flower`] — petal crowns sized by relative segment radius.
//! - [`wind`] — per-frame wind sway propagated from root to tips.
//! - [`collection`] — every plant of one generation.
//! - [`garden`] — the entry point tying the above together.
//! - [`error`] — parameter validation and preset loading errors.
//! - [`types`] — shared type aliases and IDs.

pub mod collection;
pub mod config;
pub mod error;
pub mod flower;
pub mod garden;
pub mod growth;
pub mod segment;
pub mod types;
pub mod wind;
