use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use terrarium::RunConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RON configuration file (default: ./terrarium.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// World seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Grid width in cells
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells
    #[arg(long)]
    height: Option<usize>,

    /// Upper bound on pixels processed per tick
    #[arg(long)]
    max_active: Option<usize>,

    /// Ticks between progress log lines (0 disables them)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Write the final report as RON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut config = RunConfig::load(args.config.as_deref())?;

    // Command-line flags win over file and environment
    if let Some(ticks) = args.ticks {
        config.run.ticks = ticks;
    }
    if args.seed.is_some() {
        config.run.seed = args.seed;
    }
    if let Some(interval) = args.report_interval {
        config.run.report_interval = interval;
    }
    if let Some(width) = args.width {
        config.sim.grid.width = width;
    }
    if let Some(height) = args.height {
        config.sim.grid.height = height;
    }
    if let Some(max_active) = args.max_active {
        config.sim.scheduler.max_active_pixels = max_active;
    }
    config
        .sim
        .validate()
        .context("Invalid command-line overrides")?;

    log::info!("Starting Terrarium");
    let report = terrarium::run(&config)?;

    if let Some(path) = args.report {
        report.write(&path)?;
        log::info!("Report written to {}", path.display());
    }
    Ok(())
}
