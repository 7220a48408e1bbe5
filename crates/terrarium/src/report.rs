//! Final run report

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ron::ser::PrettyConfig;
use serde::Serialize;
use terrarium_core::Simulation;
use terrarium_core::world::{Census, CountingStats};

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    pub ticks: u64,
    pub elapsed_secs: f64,
    pub ticks_per_sec: f64,
    pub active: usize,
    pub census: Census,
    pub stats: CountingStats,
}

impl RunReport {
    pub fn from_simulation(sim: &Simulation, elapsed: Duration) -> Self {
        let world = sim.world();
        let secs = elapsed.as_secs_f64();
        let ticks = world.tick();
        Self {
            seed: sim.seed(),
            width: world.grid.width(),
            height: world.grid.height(),
            ticks,
            elapsed_secs: secs,
            ticks_per_sec: if secs > 0.0 { ticks as f64 / secs } else { 0.0 },
            active: world.active().len(),
            census: sim.census(),
            stats: sim.stats().clone(),
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, PrettyConfig::default())
            .context("Failed to serialize run report")
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = self.to_ron()?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write run report to {}", path.display()))
    }
}
