//! Active-pixel scheduler: one tick = environment, physics, biology, swap

use serde::Serialize;

use super::biology::Biology;
use super::environment::Environment;
use super::physics::Physics;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::world::{SimStats, WorldRng, WorldState};

/// Summary of one completed tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick counter after the swap
    pub tick: u64,
    /// Cells scheduled for the following tick
    pub active: usize,
    /// Cells dropped by the active-set cap (incoming and outgoing)
    pub pruned: usize,
}

pub struct Scheduler {
    config: SimConfig,
}

impl Scheduler {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Advance the world by one tick
    ///
    /// An error leaves the grid as the failing step left it.
    pub fn tick<R: WorldRng + ?Sized>(
        &self,
        world: &mut WorldState,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> Result<TickReport, SimError> {
        world.check_channels()?;
        world.begin_tick();

        let cap = self.config.scheduler.max_active_pixels;
        let incoming = world.prune_current(cap, rng);
        if incoming > 0 {
            log::debug!(
                "Tick {}: pruned {} incoming active cells to cap {}",
                world.tick(),
                incoming,
                cap
            );
        }

        Environment::update(world, &self.config.environment, rng);
        Physics::update(world, &self.config.physics, rng, stats);
        Biology::update(world, &self.config.biology, rng, stats);

        let outgoing = world.finish_tick(cap, rng);
        if outgoing > 0 {
            log::debug!(
                "Tick {}: pruned {} scheduled cells to cap {}",
                world.tick(),
                outgoing,
                cap
            );
        }

        Ok(TickReport {
            tick: world.tick(),
            active: world.active().len(),
            pruned: incoming + outgoing,
        })
    }
}
