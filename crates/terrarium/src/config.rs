//! Runner configuration loaded with layered priority

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use terrarium_core::SimConfig;

/// Settings for the headless run itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Total ticks to simulate
    pub ticks: u64,
    /// World seed; drawn from system entropy when absent
    pub seed: Option<u64>,
    /// Ticks between progress log lines (0 disables them)
    pub report_interval: u64,
    /// Ticks advanced per loop iteration
    pub ticks_per_frame: u32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            ticks: 1000,
            seed: None,
            report_interval: 100,
            ticks_per_frame: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub run: RunSettings,
    pub sim: SimConfig,
}

impl RunConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `path`, or `terrarium.ron` in the working directory if it exists
    /// 3. Environment variables prefixed with `TERRARIUM_` (highest priority)
    ///
    /// Command-line overrides are applied by the caller on top of this.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("terrarium")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            .add_source(file)
            // TERRARIUM_SIM__GRID__WIDTH=640, TERRARIUM_RUN__TICKS=5000, ...
            .add_source(
                Environment::with_prefix("TERRARIUM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;
        let loaded: RunConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded
            .sim
            .validate()
            .context("Invalid simulation configuration")?;
        Ok(loaded)
    }
}
