//! Simulation driver owning the world, the scheduler and the random source

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

use super::scheduler::{Scheduler, TickReport};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::world::{Census, CountingStats, WorldGenerator, WorldState};

pub struct Simulation {
    world: WorldState,
    scheduler: Scheduler,
    rng: Xoshiro256StarStar,
    stats: CountingStats,
    seed: u64,
    paused: bool,
}

impl Simulation {
    /// Validate `config` and generate a fresh world from `seed`
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        let world =
            WorldGenerator::new(seed, config.generation.clone()).generate(&config, &mut rng);
        Ok(Self {
            world,
            scheduler: Scheduler::new(config),
            rng,
            stats: CountingStats::default(),
            seed,
            paused: false,
        })
    }

    /// Like [`Simulation::new`] with a seed drawn from system entropy
    pub fn with_entropy(config: SimConfig) -> Result<Self, SimError> {
        let seed = rand::random::<u64>();
        log::info!("Using random seed {}", seed);
        Self::new(config, seed)
    }

    /// Drive an existing world, e.g. one built by hand in a test or tool
    pub fn from_world(world: WorldState, config: SimConfig, seed: u64) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            world,
            scheduler: Scheduler::new(config),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
            stats: CountingStats::default(),
            seed,
            paused: false,
        })
    }

    /// Run one tick
    ///
    /// A failed tick pauses the simulation; later calls return
    /// [`SimError::Paused`] until [`Simulation::resume`] is called.
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        if self.paused {
            return Err(SimError::Paused);
        }
        match self
            .scheduler
            .tick(&mut self.world, &mut self.rng, &mut self.stats)
        {
            Ok(report) => Ok(report),
            Err(e) => {
                log::error!("Tick {} aborted: {}", self.world.tick(), e);
                self.paused = true;
                Err(e)
            }
        }
    }

    /// Run up to `ticks` ticks, stopping at the first error
    pub fn run(&mut self, ticks: u64) -> Result<TickReport, SimError> {
        let mut report = TickReport {
            tick: self.world.tick(),
            active: self.world.active().len(),
            pruned: 0,
        };
        for _ in 0..ticks {
            report = self.step()?;
        }
        Ok(report)
    }

    pub fn resume(&mut self) {
        if self.paused {
            log::info!("Resuming at tick {}", self.world.tick());
        }
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Direct access for tools; activate any cell you change
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        self.scheduler.config()
    }

    pub fn stats(&self) -> &CountingStats {
        &self.stats
    }

    pub fn census(&self) -> Census {
        self.world.census()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn small_config() -> SimConfig {
        let mut config = SimConfig::default();
        config.grid.width = 48;
        config.grid.height = 40;
        config.generation.rocky_depth = 10;
        config
    }

    #[test]
    fn test_same_seed_same_world() {
        let mut a = Simulation::new(small_config(), 42).expect("valid config");
        let mut b = Simulation::new(small_config(), 42).expect("valid config");
        a.run(20).expect("run");
        b.run(20).expect("run");
        assert_eq!(a.world().grid.cell_type, b.world().grid.cell_type);
        assert_eq!(a.world().grid.water, b.world().grid.water);
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_run_advances_ticks() {
        let mut sim = Simulation::new(small_config(), 7).expect("valid config");
        let report = sim.run(5).expect("run");
        assert_eq!(report.tick, 5);
        assert_eq!(sim.world().tick(), 5);
        assert!(sim.census().total() > 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config();
        config.grid.width = 0;
        match Simulation::new(config, 1) {
            Err(SimError::Config(ConfigError::EmptyGrid { width: 0, .. })) => {}
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_failed_tick_pauses_until_resumed() {
        let mut sim = Simulation::new(small_config(), 3).expect("valid config");
        let len = sim.world().grid.size();
        sim.world_mut().grid.water.push(0);
        assert!(matches!(sim.step(), Err(SimError::ChannelLength { .. })));
        assert!(sim.is_paused());
        assert!(matches!(sim.step(), Err(SimError::Paused)));

        sim.world_mut().grid.water.truncate(len);
        sim.resume();
        assert!(sim.step().is_ok());
    }
}
