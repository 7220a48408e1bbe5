//! Seed germination and decay

use terrarium_simulation::{CellType, Metadata, PlantState};

use super::{transform, vacate};
use crate::config::BiologyConfig;
use crate::simulation::physics::refresh_soil_state;
use crate::world::{Resource, SimStats, WorldRng, WorldState};

/// Water a seed can draw from one neighbor per tick
const SEED_UPTAKE: u8 = 5;

pub struct SeedLife;

impl SeedLife {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        Self::absorb(world, index, config);

        if rng.check_probability(config.seed_decay_chance) {
            world.grid.energy[index] = world.grid.energy[index].saturating_sub(1);
        }
        if world.grid.energy[index] == 0 {
            transform(world, index, CellType::DeadMatter, 0);
            stats.record_death();
            return;
        }

        if world.grid.water[index] >= config.germination_water
            && rng.check_probability(config.germination_chance)
            && Self::germinate(world, index)
        {
            stats.record_birth();
            return;
        }
        world.activate(index);
    }

    fn absorb(world: &mut WorldState, index: usize, config: &BiologyConfig) {
        for neighbor in world.grid.neighbors_of(index) {
            let n = neighbor.index;
            match world.grid.cell_type[n] {
                CellType::Soil => {
                    world.grid.transfer(
                        Resource::Water,
                        n,
                        index,
                        SEED_UPTAKE,
                        config.transfer_loss,
                        u8::MAX,
                    );
                    refresh_soil_state(&mut world.grid, n);
                }
                CellType::Water => {
                    world.grid.transfer(
                        Resource::Water,
                        n,
                        index,
                        SEED_UPTAKE,
                        config.transfer_loss,
                        u8::MAX,
                    );
                    if world.grid.water[n] == 0 {
                        vacate(world, n);
                    }
                }
                _ => {}
            }
        }
    }

    /// Sprout in place; returns false if the surroundings don't allow it
    fn germinate(world: &mut WorldState, index: usize) -> bool {
        let soil_below = world
            .grid
            .below(index)
            .filter(|&b| world.grid.cell_type[b] == CellType::Soil);
        let buried = world
            .grid
            .above(index)
            .is_some_and(|a| world.grid.cell_type[a] == CellType::Soil);

        if buried {
            transform(world, index, CellType::Plant, PlantState::Root.as_u8());
            return true;
        }
        let Some(below) = soil_below else {
            return false;
        };

        // Shoot above ground, root into the soil it rests on
        transform(world, index, CellType::Plant, PlantState::Stem.as_u8());
        world.grid.metadata[index] = Metadata::Counter(1);
        let energy = world.grid.energy[index] / 2;
        world.grid.energy[index] -= energy;
        transform(world, below, CellType::Plant, PlantState::Root.as_u8());
        world.grid.energy[below] = world.grid.energy[below].saturating_add(energy);
        true
    }
}
