//! Dead matter breaking down into fertile soil

use terrarium_simulation::{CellType, SoilState};

use super::{transform, vacate};
use crate::config::BiologyConfig;
use crate::world::{Resource, SimStats, WorldState};

/// Progress at which dead matter finishes decomposing
pub const DECOMPOSED: u8 = 100;

pub struct Decomposition;

impl Decomposition {
    /// Advance decomposition; returns true if the cell finished
    pub fn update(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        stats: &mut dyn SimStats,
    ) -> bool {
        let rate = Self::rate(world, index, config);
        let progress = world.grid.metadata[index].bump(rate);
        if progress < DECOMPOSED {
            world.activate(index);
            return false;
        }

        Self::finish(world, index, config);
        stats.record_conversion();
        true
    }

    /// Progress gained this tick from moisture, worms and warmth around the cell
    fn rate(world: &WorldState, index: usize, config: &BiologyConfig) -> u8 {
        let mut rate: u8 = 1;
        for neighbor in world.grid.neighbors_of(index) {
            let n = neighbor.index;
            let boost = match world.grid.cell_type[n] {
                CellType::Water => 1,
                CellType::Worm => 3,
                CellType::Soil if world.grid.soil_state(n) == Some(SoilState::Wet) => 1,
                _ => 0,
            };
            rate = rate.saturating_add(boost);
        }
        let temperature = world
            .forcing
            .temperature_at(world.grid.width(), index);
        if temperature >= config.warm_decomposition_temperature {
            rate = rate.saturating_add(1);
        }
        rate
    }

    fn finish(world: &mut WorldState, index: usize, config: &BiologyConfig) {
        let below = world.grid.below(index);
        let below_type = below.map(|b| world.grid.cell_type[b]);

        match (below, below_type) {
            (Some(water), Some(CellType::Water)) => {
                // Dissolves into the water underneath
                let nutrient = world.grid.nutrient[index];
                world.grid.transfer(
                    Resource::Nutrient,
                    index,
                    water,
                    nutrient,
                    config.transfer_loss,
                    u8::MAX,
                );
                vacate(world, index);
                world.activate(water);
            }
            (Some(target), Some(CellType::Soil | CellType::Plant)) => {
                Self::settle(world, index, config);
                world.grid.transfer(
                    Resource::Nutrient,
                    index,
                    target,
                    config.decomposition_nutrient / 2,
                    config.transfer_loss,
                    u8::MAX,
                );
                world.activate(target);
            }
            _ => Self::settle(world, index, config),
        }
    }

    /// Become fertile soil in place
    fn settle(world: &mut WorldState, index: usize, config: &BiologyConfig) {
        transform(world, index, CellType::Soil, SoilState::Fertile.as_u8());
        world.grid.nutrient[index] = world.grid.nutrient[index].max(config.decomposition_nutrient);
        world.grid.energy[index] = 0;
    }
}
