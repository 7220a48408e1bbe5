//! Water wearing away neighboring soil

use terrarium_simulation::CellType;

use crate::config::PhysicsConfig;
use crate::world::{Resource, SimStats, WorldRng, WorldState};

pub struct Erosion;

impl Erosion {
    /// Each sampled water cell erodes at most one soil neighbor
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        let mut eroded = 0;
        for &index in snapshot {
            if world.is_processed(index) || world.grid.cell_type[index] != CellType::Water {
                continue;
            }
            if !rng.check_probability(config.erosion_sample_chance) {
                continue;
            }
            if Self::erode(world, index, config, rng) {
                stats.record_conversion();
                eroded += 1;
            }
        }
        if eroded > 0 {
            log::trace!("Erosion converted {} soil cells", eroded);
        }
        eroded
    }

    fn erode<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        water: usize,
        config: &PhysicsConfig,
        rng: &mut R,
    ) -> bool {
        let soil: Vec<usize> = world
            .grid
            .neighbors_of(water)
            .iter()
            .map(|n| n.index)
            .filter(|&i| world.grid.cell_type[i] == CellType::Soil && !world.is_processed(i))
            .collect();
        if soil.is_empty() {
            return false;
        }
        let target = soil[rng.gen_index(soil.len())];

        let strength = config.erosion_strength * world.grid.water[water] as f32 / 255.0;
        if !rng.check_probability(strength) {
            return false;
        }

        let nutrient = world.grid.nutrient[target];
        world.grid.transfer(
            Resource::Nutrient,
            target,
            water,
            nutrient,
            config.transfer_loss,
            u8::MAX,
        );

        // The new water cell keeps the soil's moisture plus half of the eroder's water
        let share = world.grid.water[water] / 2;
        world.grid.water[water] -= share;
        world.grid.water[target] = world.grid.water[target].saturating_add(share);

        world.convert(target, CellType::Water, 0);
        world.activate(water);
        true
    }
}
