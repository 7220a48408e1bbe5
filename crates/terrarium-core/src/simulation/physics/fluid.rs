//! Water movement: falling, spreading, soaking into soil and evaporation

use std::cmp::Reverse;

use terrarium_simulation::{CellType, SoilState};

use super::soil_moisture::{refresh_soil_state, soil_capacity};
use crate::config::PhysicsConfig;
use crate::simulation::stuck::{Escalation, StuckLadder};
use crate::world::rng_trait::shuffle;
use crate::world::{Resource, SimStats, WorldRng, WorldState, evaporation_factor};

/// Rows around the ground level where water spreads more eagerly
const GROUND_SPREAD_ROWS: i32 = 3;

/// Chance a seed lets water sink past it
const SEED_SINK_CHANCE: f32 = 0.5;

/// Chance dead matter lets water sink past it
const DEAD_MATTER_SINK_CHANCE: f32 = 0.3;

/// Outcome of trying to move one water cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Moved,
    Gone,
    Stuck,
}

pub struct FluidDynamics;

impl FluidDynamics {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        let width = world.grid.width();
        let mut water: Vec<usize> = snapshot
            .iter()
            .copied()
            .filter(|&i| world.grid.cell_type[i] == CellType::Water && !world.is_processed(i))
            .collect();
        // Bottom rows first so columns fall without cascading
        water.sort_by_key(|&i| Reverse(i / width));

        if water.len() > config.water_emergency_threshold {
            Self::emergency_drain(world, &water, config, rng, stats);
        }

        let ladder = StuckLadder::fluid(config);
        let mut moved = 0;
        for index in water {
            if world.is_processed(index) || world.grid.cell_type[index] != CellType::Water {
                continue;
            }
            if Self::update_cell(world, index, config, &ladder, rng, stats) != Flow::Stuck {
                moved += 1;
            }
        }
        moved
    }

    /// Remove a fraction of the water sitting at or below ground level
    fn emergency_drain<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        water: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        let floor = world.ground_level() as i32 - 1;
        let width = world.grid.width();
        let mut candidates: Vec<usize> = water
            .iter()
            .copied()
            .filter(|&i| (i / width) as i32 >= floor)
            .collect();
        let count = (candidates.len() as f32 * config.emergency_drain_fraction) as usize;
        shuffle(&mut candidates, rng);
        for &index in &candidates[..count] {
            world.clear(index);
            stats.record_conversion();
        }
        log::debug!(
            "Emergency drainage: {} water cells active (limit {}), removed {}",
            water.len(),
            config.water_emergency_threshold,
            count
        );
    }

    fn update_cell<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &PhysicsConfig,
        ladder: &StuckLadder,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> Flow {
        let stuck = world.grid.metadata[index].counter();

        if world.is_above_ground(index) {
            let temperature = world.forcing.temperature_at(world.grid.width(), index);
            let chance = config.evaporation_chance
                * evaporation_factor(temperature)
                * (1.0 + stuck as f32 / 10.0);
            if rng.check_probability(chance) {
                world.clear(index);
                stats.record_conversion();
                return Flow::Gone;
            }
        }

        let flow = Self::flow_down(world, index, stuck, config, rng, stats);
        if flow != Flow::Stuck {
            return flow;
        }

        let escalation = ladder.action(stuck);
        if Self::spread(world, index, escalation, config, rng, stats)
            || Self::flow_diagonal(world, index, rng, stats)
        {
            return Flow::Moved;
        }

        match escalation {
            Escalation::Force => {
                if Self::force_move(world, index, rng, stats) {
                    return Flow::Moved;
                }
            }
            Escalation::Convert => {
                if Self::force_move(world, index, rng, stats) {
                    return Flow::Moved;
                }
                if rng.check_probability(config.convert_chance) {
                    if world.is_above_ground(index) {
                        world.clear(index);
                    } else {
                        world.convert(index, CellType::Soil, SoilState::Wet.as_u8());
                        refresh_soil_state(&mut world.grid, index);
                    }
                    stats.record_conversion();
                    return Flow::Gone;
                }
            }
            Escalation::Normal | Escalation::Loosen => {}
        }

        world.grid.metadata[index].bump(1);
        world.activate(index);
        Flow::Stuck
    }

    /// Handle whatever is directly below
    fn flow_down<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        stuck: u8,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> Flow {
        let Some(below) = world.grid.below(index) else {
            return Flow::Stuck;
        };
        if world.is_processed(below) {
            return Flow::Stuck;
        }

        match world.grid.cell_type[below] {
            CellType::Air => {
                Self::move_to(world, index, below, stats);
                Flow::Moved
            }
            CellType::Soil => {
                let rate = if stuck >= config.absorb_stuck_threshold {
                    1.0
                } else {
                    config.soil_absorb_rate
                };
                Self::soak(world, index, below, rate, config, stats)
            }
            CellType::Plant => {
                let amount = world.grid.water[index];
                let delivered = world.grid.transfer(
                    Resource::Water,
                    index,
                    below,
                    amount,
                    config.transfer_loss,
                    u8::MAX,
                );
                if delivered > 0 {
                    world.activate(below);
                }
                Self::empty_check(world, index, stats)
            }
            CellType::Insect | CellType::Worm => {
                let clinging = world.grid.metadata[below]
                    .insect()
                    .is_some_and(|insect| insect.on_plant);
                if clinging {
                    return Flow::Stuck;
                }
                Self::move_to(world, index, below, stats);
                Flow::Moved
            }
            CellType::Seed => {
                Self::wet_and_sink(world, index, below, SEED_SINK_CHANCE, config, rng, stats)
            }
            CellType::DeadMatter => {
                Self::wet_and_sink(world, index, below, DEAD_MATTER_SINK_CHANCE, config, rng, stats)
            }
            CellType::Water => Flow::Stuck,
        }
    }

    /// Let soil below take up water, up to its capacity
    fn soak(
        world: &mut WorldState,
        index: usize,
        soil: usize,
        rate: f32,
        config: &PhysicsConfig,
        stats: &mut dyn SimStats,
    ) -> Flow {
        let amount = (world.grid.water[index] as f32 * rate).ceil() as u8;
        let capacity = soil_capacity(world, soil, config);
        let delivered =
            world
                .grid
                .transfer(Resource::Water, index, soil, amount, config.transfer_loss, capacity);
        if delivered > 0 {
            refresh_soil_state(&mut world.grid, soil);
            world.mark_processed(soil);
            world.activate(soil);
        }
        Self::empty_check(world, index, stats)
    }

    /// Soak an obstacle, then maybe sink past it
    fn wet_and_sink<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        below: usize,
        sink_chance: f32,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> Flow {
        let amount = world.grid.water[index] / 2;
        world
            .grid
            .transfer(Resource::Water, index, below, amount, config.transfer_loss, u8::MAX);
        if Self::empty_check(world, index, stats) == Flow::Gone {
            return Flow::Gone;
        }
        if rng.check_probability(sink_chance) {
            Self::move_to(world, index, below, stats);
            return Flow::Moved;
        }
        Flow::Stuck
    }

    /// A water cell with nothing left in it turns to AIR
    fn empty_check(world: &mut WorldState, index: usize, stats: &mut dyn SimStats) -> Flow {
        if world.grid.water[index] == 0 {
            world.clear(index);
            stats.record_conversion();
            Flow::Gone
        } else {
            Flow::Stuck
        }
    }

    fn spread<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        escalation: Escalation,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let chance = if escalation >= Escalation::Loosen {
            1.0
        } else if world.depth(index).abs() <= GROUND_SPREAD_ROWS {
            config.ground_spread_chance
        } else {
            config.spread_chance
        };
        if !rng.check_probability(chance) {
            return false;
        }
        let first = rng.gen_sign();
        for dx in [first, -first] {
            if let Some(target) = world.grid.offset(index, dx, 0)
                && Self::is_open(world, target)
            {
                Self::move_to(world, index, target, stats);
                return true;
            }
        }
        false
    }

    fn flow_diagonal<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let first = rng.gen_sign();
        for dx in [first, -first] {
            if let Some(target) = world.grid.offset(index, dx, 1)
                && Self::is_open(world, target)
            {
                Self::move_to(world, index, target, stats);
                return true;
            }
        }
        false
    }

    /// Push into any free neighbor
    fn force_move<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let open: Vec<usize> = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| Self::is_open(world, n))
            .collect();
        if open.is_empty() {
            return false;
        }
        let target = open[rng.gen_index(open.len())];
        Self::move_to(world, index, target, stats);
        true
    }

    fn is_open(world: &WorldState, index: usize) -> bool {
        world.grid.cell_type[index] == CellType::Air && !world.is_processed(index)
    }

    fn move_to(world: &mut WorldState, from: usize, to: usize, stats: &mut dyn SimStats) {
        if world.relocate(from, to) {
            world.grid.metadata[to].reset();
            stats.record_pixel_moved();
        }
    }
}
