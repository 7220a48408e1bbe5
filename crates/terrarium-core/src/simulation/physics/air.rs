//! Wind acting through air cells above ground

use glam::IVec2;
use terrarium_simulation::CellType;

use crate::config::PhysicsConfig;
use crate::world::{SimStats, WorldRng, WorldState};

/// Chance a light object is blown into the air cell
const SEED_BLOW_CHANCE: f32 = 1.0;
const DEAD_MATTER_BLOW_CHANCE: f32 = 0.2;

pub struct AirDynamics;

impl AirDynamics {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        let wind = world.forcing.wind;
        let mut moved = 0;
        for &index in snapshot {
            if world.is_processed(index)
                || world.grid.cell_type[index] != CellType::Air
                || !world.is_above_ground(index)
            {
                continue;
            }

            if Self::push_hanging_water(world, index, wind.drift_step(), config, rng, stats) {
                moved += 1;
                continue;
            }

            if !rng.check_probability(wind.strength * config.air_move_chance) {
                continue;
            }
            let turbulence = IVec2::new(rng.gen_range_i32(-1, 1), rng.gen_range_i32(-1, 1));
            let offset = wind.displacement() + turbulence;
            if offset == IVec2::ZERO {
                continue;
            }
            if Self::gust(world, index, offset, rng, stats) {
                moved += 1;
            }
        }
        moved
    }

    /// Act on the cell at `offset` from an air cell
    fn gust<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        air: usize,
        offset: IVec2,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let Some(target) = world.grid.offset(air, offset.x, offset.y) else {
            return false;
        };
        if world.is_processed(target) {
            return false;
        }

        let blow_chance = match world.grid.cell_type[target] {
            CellType::Plant => {
                // Rustle
                world.activate(target);
                return false;
            }
            CellType::Seed => SEED_BLOW_CHANCE,
            CellType::DeadMatter => DEAD_MATTER_BLOW_CHANCE,
            // Pull water sideways or down, never up into air above it
            CellType::Water if offset.y <= 0 => 1.0,
            _ => return false,
        };

        if !rng.check_probability(blow_chance) {
            return false;
        }
        if world.relocate(target, air) {
            stats.record_pixel_moved();
            return true;
        }
        false
    }

    /// Water upwind of this air cell with nothing under it drifts into it
    fn push_hanging_water<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        air: usize,
        drift: i32,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let Some(upwind) = world.grid.offset(air, -drift, 0) else {
            return false;
        };
        if world.grid.cell_type[upwind] != CellType::Water || world.is_processed(upwind) {
            return false;
        }
        let hanging = world
            .grid
            .below(upwind)
            .is_some_and(|b| world.grid.cell_type[b] == CellType::Air);
        if !hanging || !rng.check_probability(config.midair_water_push_chance) {
            return false;
        }
        if world.relocate(upwind, air) {
            stats.record_pixel_moved();
            return true;
        }
        false
    }
}
