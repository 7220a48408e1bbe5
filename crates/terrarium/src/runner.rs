//! Headless simulation loop

use std::time::Instant;

use anyhow::{Context, Result};
use terrarium_core::Simulation;

use crate::config::RunConfig;
use crate::report::RunReport;

/// Build a world from `config` and run it for the configured number of ticks
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let mut sim = match config.run.seed {
        Some(seed) => Simulation::new(config.sim.clone(), seed),
        None => Simulation::with_entropy(config.sim.clone()),
    }
    .context("Failed to create simulation")?;

    log::info!(
        "Starting {}x{} world (seed {}) for {} ticks",
        config.sim.grid.width,
        config.sim.grid.height,
        sim.seed(),
        config.run.ticks
    );
    log::info!("Initial census: {}", sim.census());

    let started = Instant::now();
    run_ticks(&mut sim, config)?;
    let report = RunReport::from_simulation(&sim, started.elapsed());

    log::info!(
        "Finished {} ticks in {:.2}s ({:.1} ticks/s)",
        report.ticks,
        report.elapsed_secs,
        report.ticks_per_sec
    );
    log::info!("Final census: {}", report.census);
    log::info!(
        "Moved {} pixels, {} conversions, {} births, {} deaths",
        report.stats.pixels_moved,
        report.stats.conversions,
        report.stats.births,
        report.stats.deaths
    );
    Ok(report)
}

fn run_ticks(sim: &mut Simulation, config: &RunConfig) -> Result<()> {
    let total = config.run.ticks;
    let per_frame = u64::from(config.run.ticks_per_frame.max(1));
    let interval = config.run.report_interval;

    let mut done = 0;
    while done < total {
        let batch = per_frame.min(total - done);
        let report = sim
            .run(batch)
            .with_context(|| format!("Simulation stopped at tick {}", sim.world().tick()))?;
        let before = done;
        done += batch;

        if interval > 0 && before / interval != done / interval {
            log::info!(
                "Tick {}: active={} pruned={} | {}",
                report.tick,
                report.active,
                report.pruned,
                sim.census()
            );
        }
    }
    Ok(())
}
