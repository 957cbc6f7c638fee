//! Application entry point for the flowering plants viewer.
//!
//! This binary sets up logging, loads an optional parameter preset, plants
//! the garden and delegates all interactive logic and rendering to
//! [`Viewer`] from the `viewer` module.

mod viewer;

use plant_core::{
    config::{ParameterSet, load_params},
    garden::Garden,
};
use rand::Rng;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use viewer::Viewer;

/// Preset file used when none is given on the command line.
const DEFAULT_PRESET: &str = "plants.toml";

/// Loads the preset at `path`, falling back to the default parameters.
fn load_or_default(path: &Path) -> ParameterSet {
    if !path.exists() {
        tracing::info!("no preset at {}, using defaults", path.display());
        return ParameterSet::default();
    }

    match load_params(path) {
        Ok(params) => params,
        Err(err) => {
            tracing::warn!(%err, "failed to load preset {}, using defaults", path.display());
            ParameterSet::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the garden cannot be planted or eframe fails to create the
///   native window or event loop.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let preset_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRESET));
    let params = load_or_default(&preset_path);

    let seed: u64 = rand::rng().random();
    tracing::info!(seed, "planting garden");
    let garden = Garden::new(params, seed)?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Flowering Plants",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::new(garden, preset_path)))),
    )
    .map_err(|err| anyhow::anyhow!("viewer failed: {err}"))
}
