//! Worms tunnel through soil and turn dead matter into fertile soil

use terrarium_simulation::{CellType, SoilState};

use super::{is_stressed, transform};
use crate::config::BiologyConfig;
use crate::world::rng_trait::weighted_choice;
use crate::world::{SimStats, WorldRng, WorldState};

pub struct WormBehavior;

impl WormBehavior {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        if rng.check_probability(config.worm_metabolism_chance) {
            world.grid.energy[index] = world.grid.energy[index].saturating_sub(1);
        }
        if is_stressed(world, index, config) {
            world.grid.energy[index] = world.grid.energy[index].saturating_sub(1);
        }
        if world.grid.energy[index] == 0 {
            transform(world, index, CellType::Soil, SoilState::Fertile.as_u8());
            stats.record_death();
            return;
        }

        if Self::eat(world, index, config, rng) {
            stats.record_conversion();
            world.activate(index);
            return;
        }

        if rng.check_probability(config.worm_move_chance)
            && let Some(target) = Self::pick_tunnel(world, index, rng)
            && world.relocate_bio(index, target)
        {
            // Worked soil stays behind
            world
                .grid
                .set_cell(index, CellType::Soil, SoilState::Fertile.as_u8());
            stats.record_pixel_moved();
            return;
        }
        world.activate(index);
    }

    fn eat<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) -> bool {
        let food: Vec<usize> = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| world.grid.cell_type[n] == CellType::DeadMatter)
            .collect();
        if food.is_empty() {
            return false;
        }
        let meal = food[rng.gen_index(food.len())];

        transform(world, meal, CellType::Soil, SoilState::Fertile.as_u8());
        world.grid.nutrient[meal] = world.grid.nutrient[meal].saturating_add(config.worm_meal_nutrient);
        world.grid.energy[meal] = 0;
        world.grid.energy[index] = world.grid.energy[index].saturating_add(config.worm_meal_energy);
        true
    }

    /// Weighted pick of an adjacent soil or dead matter cell near or below ground
    fn pick_tunnel<R: WorldRng + ?Sized>(
        world: &WorldState,
        index: usize,
        rng: &mut R,
    ) -> Option<usize> {
        let mut targets = Vec::with_capacity(8);
        let mut weights = Vec::with_capacity(8);
        for neighbor in world.grid.neighbors_of(index) {
            let n = neighbor.index;
            if world.depth(n) < -1 {
                continue;
            }
            let weight = match world.grid.cell_type[n] {
                CellType::DeadMatter => 4.0,
                CellType::Soil => match world.grid.soil_state(n) {
                    Some(SoilState::Fertile) => 3.0,
                    Some(SoilState::Wet) => 2.0,
                    _ => 1.0,
                },
                _ => continue,
            };
            targets.push(n);
            weights.push(weight);
        }
        weighted_choice(&weights, rng).map(|choice| targets[choice])
    }
}
