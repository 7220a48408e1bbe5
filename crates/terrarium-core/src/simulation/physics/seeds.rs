//! Seed dispersal from flowers and sliding of seeds on the surface

use terrarium_simulation::{CellType, PlantState};

use crate::config::PhysicsConfig;
use crate::world::{SimStats, WorldRng, WorldState};

/// Flowers scatter seeds; surface seeds slide sideways
pub struct SeedDispersal;

impl SeedDispersal {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        let mut events = 0;
        for &index in snapshot {
            if world.is_processed(index) {
                continue;
            }
            match world.grid.cell_type[index] {
                CellType::Plant if world.grid.plant_state(index) == Some(PlantState::Flower) => {
                    events += Self::disperse(world, index, config, rng, stats);
                }
                CellType::Seed => {
                    if Self::slide(world, index, config, rng, stats) {
                        events += 1;
                    }
                }
                _ => {}
            }
        }
        events
    }

    /// Throw seeds from a flower; returns the number placed
    fn disperse<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        flower: usize,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        // Flowers stay active
        world.activate(flower);

        if world.grid.energy[flower] < config.dispersal_energy_cost
            || !rng.check_probability(config.seed_dispersal_chance)
        {
            return 0;
        }

        let radius = config.seed_dispersal_radius;
        let dx = rng.gen_range_i32(-radius, radius);
        let dy = rng.gen_range_i32(-radius, radius);
        let Some(target) = world.grid.offset(flower, dx, dy) else {
            return 0;
        };
        if !Self::place_seed(world, flower, target, config, stats) {
            return 0;
        }

        let mut placed = 1;
        if rng.check_probability(config.seed_cluster_chance) {
            let free: Vec<usize> = world
                .grid
                .neighbors_of(target)
                .iter()
                .filter(|n| world.grid.cell_type[n.index] == CellType::Air)
                .map(|n| n.index)
                .collect();
            if !free.is_empty() {
                let second = free[rng.gen_index(free.len())];
                if Self::place_seed(world, flower, second, config, stats) {
                    placed += 1;
                }
            }
        }
        placed
    }

    fn place_seed(
        world: &mut WorldState,
        flower: usize,
        target: usize,
        config: &PhysicsConfig,
        stats: &mut dyn SimStats,
    ) -> bool {
        if world.grid.cell_type[target] != CellType::Air
            || world.is_processed(target)
            || world.grid.energy[flower] < config.dispersal_energy_cost
        {
            return false;
        }
        world.grid.energy[flower] -= config.dispersal_energy_cost;
        world.convert(target, CellType::Seed, 0);
        world.grid.energy[target] = config.dispersed_seed_energy;
        stats.record_birth();
        true
    }

    /// Slide a seed resting on soil or a plant
    fn slide<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        seed: usize,
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let resting = world
            .grid
            .below(seed)
            .is_some_and(|b| matches!(world.grid.cell_type[b], CellType::Soil | CellType::Plant));
        if !resting || !rng.check_probability(config.seed_slide_chance) {
            return false;
        }

        let distance = rng.gen_range_i32(1, 3) * rng.gen_sign();
        let Some(target) = world.grid.offset(seed, distance, 0) else {
            return false;
        };
        if world.grid.cell_type[target] != CellType::Air || world.is_processed(target) {
            return false;
        }

        if !world.relocate(seed, target) {
            return false;
        }
        world.grid.metadata[target].reset();
        stats.record_pixel_moved();
        true
    }
}
