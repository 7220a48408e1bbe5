//! Physics rule engine
//!
//! Rules run in a fixed order over the cells active at the start of the tick.
//! A cell that moved or changed type is flagged processed and skipped by every
//! later rule until the next tick.

mod air;
mod erosion;
mod fluid;
mod gravity;
mod seeds;
mod soil_moisture;

pub use air::AirDynamics;
pub use erosion::Erosion;
pub use fluid::FluidDynamics;
pub use gravity::Gravity;
pub use seeds::SeedDispersal;
pub use soil_moisture::{SoilMoisture, refresh_soil_state, soil_capacity};

use crate::config::PhysicsConfig;
use crate::world::{SimStats, WorldRng, WorldState};

pub struct Physics;

impl Physics {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        let snapshot: Vec<usize> = world.active().as_slice().to_vec();

        let seeds = SeedDispersal::update(world, &snapshot, config, rng, stats);
        let water = FluidDynamics::update(world, &snapshot, config, rng, stats);
        let moisture = SoilMoisture::update(world, &snapshot, config, rng);
        let fallen = Gravity::update(world, &snapshot, config, rng, stats);
        let eroded = Erosion::update(world, &snapshot, config, rng, stats);
        let blown = AirDynamics::update(world, &snapshot, config, rng, stats);

        log::trace!(
            "Physics tick {}: {} cells, seeds={} water={} moisture={} gravity={} erosion={} wind={}",
            world.tick(),
            snapshot.len(),
            seeds,
            water,
            moisture,
            fallen,
            eroded,
            blown
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::{NoopStats, WorldGenerator};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use terrarium_simulation::CellType;

    #[test]
    fn test_processed_cells_are_left_alone() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(8);
        let mut config = SimConfig::default();
        config.grid.width = 64;
        config.grid.height = 48;
        let mut world =
            WorldGenerator::new(8, config.generation.clone()).generate(&config, &mut rng);

        world.begin_tick();
        // Freeze every other active cell before physics runs
        let frozen: Vec<usize> = world.active().iter().step_by(2).collect();
        for &i in &frozen {
            world.mark_processed(i);
        }
        let before: Vec<(CellType, u8, u8)> = frozen
            .iter()
            .map(|&i| (world.grid.cell_type[i], world.grid.state[i], world.grid.water[i]))
            .collect();

        Physics::update(&mut world, &config.physics, &mut rng, &mut NoopStats);

        for (&i, expected) in frozen.iter().zip(before) {
            let after = (world.grid.cell_type[i], world.grid.state[i], world.grid.water[i]);
            assert_eq!(after, expected, "processed cell {i} changed");
        }
    }

    #[test]
    fn test_single_drop_scenario() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut config = SimConfig::quiet();
        config.grid.width = 8;
        config.grid.height = 8;
        let mut world = WorldState::new(&config);
        let drop = world.grid.index(4, 1).expect("in bounds");
        world.grid.set_cell(drop, CellType::Water, 0);
        world.grid.water[drop] = 100;
        world.activate(drop);

        world.begin_tick();
        Physics::update(&mut world, &config.physics, &mut rng, &mut NoopStats);

        let below = world.grid.below(drop).expect("in bounds");
        assert_eq!(world.grid.cell_type[drop], CellType::Air);
        assert_eq!(world.grid.water[drop], 0);
        assert_eq!(world.grid.cell_type[below], CellType::Water);
        assert_eq!(world.grid.water[below], 100);
    }
}
