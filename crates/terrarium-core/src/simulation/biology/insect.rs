//! Insects: grazing, breeding and moving over plants

use terrarium_simulation::{CellType, InsectState, Metadata, PlantSnapshot, PlantState};

use super::{is_stressed, transform, vacate};
use crate::config::BiologyConfig;
use crate::world::{Grid, SimStats, WorldRng, WorldState};

pub struct InsectBehavior;

impl InsectBehavior {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        if world.grid.metadata[index].repair_insect() {
            log::warn!("Insect at {} had no insect record, resetting it", index);
        }

        if rng.check_probability(config.insect_metabolism_chance) {
            world.grid.energy[index] = world.grid.energy[index].saturating_sub(1);
        }
        if is_stressed(world, index, config) {
            world.grid.energy[index] = world.grid.energy[index].saturating_sub(1);
        }

        let energy = world.grid.energy[index];
        let hungry = energy < config.hunger_threshold;
        let starvation = match world.grid.metadata[index].insect_mut() {
            Some(insect) => {
                insect.starvation = if hungry {
                    insect.starvation.saturating_add(1)
                } else {
                    0
                };
                insect.starvation
            }
            None => 0,
        };

        if energy == 0 || starvation > config.starvation_limit {
            Self::die(world, index);
            stats.record_death();
            return;
        }

        if energy < config.eat_threshold && Self::eat(world, index, config, rng) {
            world.activate(index);
            return;
        }

        if energy >= config.insect_reproduce_energy
            && rng.check_probability(config.insect_reproduce_chance)
            && Self::reproduce(world, index, rng)
        {
            stats.record_birth();
        }

        if rng.check_probability(config.insect_move_chance)
            && let Some(target) = Self::step_target(world, index, config, rng)
            && Self::move_insect(world, index, target, config, rng)
        {
            stats.record_pixel_moved();
            return;
        }
        world.activate(index);
    }

    /// Dead insects give back the plant they sat on, otherwise leave a body
    fn die(world: &mut WorldState, index: usize) {
        let saved = world.grid.metadata[index]
            .insect_mut()
            .and_then(InsectState::take_plant);
        match saved {
            Some(plant) => {
                restore_plant(&mut world.grid, index, plant);
                world.mark_bio_processed(index);
                world.activate_area(index);
            }
            None => transform(world, index, CellType::DeadMatter, 0),
        }
    }

    /// Bite a neighboring plant; returns true if anything was eaten
    fn eat<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) -> bool {
        let plants: Vec<usize> = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| world.grid.cell_type[n] == CellType::Plant)
            .collect();
        if plants.is_empty() {
            return false;
        }
        let target = plants[rng.gen_index(plants.len())];

        match world.grid.plant_state(target) {
            Some(PlantState::Root) => {
                let bite = config.root_bite.min(world.grid.energy[target]);
                world.grid.energy[target] -= bite;
                world.grid.energy[index] = world.grid.energy[index].saturating_add(bite);
                if world.grid.energy[target] == 0 {
                    transform(world, target, CellType::DeadMatter, 0);
                } else {
                    world.activate(target);
                }
            }
            Some(_) => {
                let gain = (world.grid.energy[target] / 2).max(1);
                world.grid.energy[index] = world.grid.energy[index].saturating_add(gain);
                vacate(world, target);
            }
            None => return false,
        }
        true
    }

    fn reproduce<R: WorldRng + ?Sized>(world: &mut WorldState, index: usize, rng: &mut R) -> bool {
        let free: Vec<usize> = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| world.grid.cell_type[n] == CellType::Air)
            .collect();
        if free.is_empty() {
            return false;
        }
        let child = free[rng.gen_index(free.len())];
        let share = world.grid.energy[index] / 2;
        world.grid.energy[index] -= share;
        transform(world, child, CellType::Insect, 0);
        world.grid.energy[child] = share;
        true
    }

    /// Step toward the nearest plant in range, or a random direction
    fn step_target<R: WorldRng + ?Sized>(
        world: &WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) -> Option<usize> {
        let (x, y) = world.grid.coords(index)?;
        let (x, y) = (x as i32, y as i32);
        let radius = config.insect_sense_radius;

        let mut nearest: Option<(i32, i32, i32)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(i) = world.grid.index(x + dx, y + dy) else {
                    continue;
                };
                if world.grid.cell_type[i] != CellType::Plant {
                    continue;
                }
                let distance = dx * dx + dy * dy;
                if nearest.is_none_or(|(_, _, best)| distance < best) {
                    nearest = Some((dx, dy, distance));
                }
            }
        }

        let (sx, sy) = match nearest {
            Some((dx, dy, _)) => (dx.signum(), dy.signum()),
            None => (rng.gen_range_i32(-1, 1), rng.gen_range_i32(-1, 1)),
        };
        if sx == 0 && sy == 0 {
            return None;
        }
        world.grid.offset(index, sx, sy)
    }

    /// Move onto open air or soft plant tissue, carrying the plant record along
    fn move_insect<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        from: usize,
        to: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) -> bool {
        let landing = match world.grid.cell_type[to] {
            CellType::Air => None,
            CellType::Plant => {
                let Some(plant) = snapshot_plant(&world.grid, to) else {
                    return false;
                };
                if !plant.state.is_soft_tissue() || !rng.check_probability(config.insect_land_chance)
                {
                    return false;
                }
                Some(plant)
            }
            _ => return false,
        };

        let mut insect = world.grid.metadata[from]
            .insect()
            .copied()
            .unwrap_or_default();
        let leaving = insect.take_plant();
        insect.on_plant = landing.is_some();
        insect.saved_plant = landing;

        let grid = &mut world.grid;
        grid.set_cell(to, CellType::Insect, 0);
        grid.metadata[to] = Metadata::Insect(insect);
        grid.water[to] = grid.water[from];
        grid.nutrient[to] = grid.nutrient[from];
        grid.energy[to] = grid.energy[from];
        match leaving {
            Some(plant) => restore_plant(grid, from, plant),
            None => grid.clear_cell(from),
        }

        world.mark_bio_processed(from);
        world.mark_bio_processed(to);
        world.activate_area(from);
        world.activate_area(to);
        true
    }
}

fn snapshot_plant(grid: &Grid, index: usize) -> Option<PlantSnapshot> {
    let state = grid.plant_state(index)?;
    Some(PlantSnapshot {
        state,
        water: grid.water[index],
        nutrient: grid.nutrient[index],
        energy: grid.energy[index],
        counter: grid.metadata[index].counter(),
    })
}

fn restore_plant(grid: &mut Grid, index: usize, plant: PlantSnapshot) {
    grid.set_cell(index, CellType::Plant, plant.state.as_u8());
    grid.metadata[index] = Metadata::Counter(plant.counter);
    grid.water[index] = plant.water;
    grid.nutrient[index] = plant.nutrient;
    grid.energy[index] = plant.energy;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::NoopStats;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn world(width: usize, height: usize) -> WorldState {
        let mut config = SimConfig::quiet();
        config.grid.width = width;
        config.grid.height = height;
        WorldState::new(&config)
    }

    fn calm() -> BiologyConfig {
        BiologyConfig {
            insect_metabolism_chance: 0.0,
            insect_reproduce_chance: 0.0,
            insect_move_chance: 0.0,
            ..BiologyConfig::default()
        }
    }

    fn insect(world: &mut WorldState, index: usize, energy: u8) {
        world.grid.set_cell(index, CellType::Insect, 0);
        world.grid.energy[index] = energy;
    }

    fn leaf(world: &mut WorldState, index: usize, energy: u8) {
        world.grid.set_cell(index, CellType::Plant, PlantState::Leaf.as_u8());
        world.grid.energy[index] = energy;
    }

    #[test]
    fn test_missing_record_is_repaired() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        insect(&mut world, 4, 200);
        world.grid.metadata[4] = Metadata::Counter(17);

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[4], CellType::Insect);
        assert!(world.grid.metadata[4].insect().is_some());
    }

    #[test]
    fn test_starving_insect_dies() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        let config = calm();
        insect(&mut world, 4, 10);
        world.grid.metadata[4] = Metadata::Insect(InsectState {
            starvation: config.starvation_limit,
            ..InsectState::default()
        });

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[4], CellType::DeadMatter);
    }

    #[test]
    fn test_insect_dying_on_plant_restores_it() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        let saved = PlantSnapshot {
            state: PlantState::Stem,
            water: 12,
            nutrient: 7,
            energy: 60,
            counter: 5,
        };
        insect(&mut world, 4, 1);
        world.grid.metadata[4] = Metadata::Insect(InsectState {
            starvation: 0,
            on_plant: true,
            saved_plant: Some(saved),
        });
        let config = BiologyConfig {
            insect_metabolism_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.plant_state(4), Some(PlantState::Stem));
        assert_eq!(world.grid.energy[4], 60);
        assert_eq!(world.grid.water[4], 12);
        assert_eq!(world.grid.metadata[4], Metadata::Counter(5));
    }

    #[test]
    fn test_hungry_insect_eats_leaf() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        insect(&mut world, 4, 50);
        leaf(&mut world, 5, 80);

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[5], CellType::Air);
        assert_eq!(world.grid.energy[4], 90);
    }

    #[test]
    fn test_root_is_bitten_not_destroyed() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        let config = calm();
        insect(&mut world, 4, 50);
        world.grid.set_cell(7, CellType::Plant, PlantState::Root.as_u8());
        world.grid.energy[7] = 100;

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.plant_state(7), Some(PlantState::Root));
        assert_eq!(world.grid.energy[7], 100 - config.root_bite);
        assert_eq!(world.grid.energy[4], 50 + config.root_bite);
    }

    #[test]
    fn test_well_fed_insect_reproduces() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 3);
        insect(&mut world, 4, 200);
        let config = BiologyConfig {
            insect_reproduce_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        InsectBehavior::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.census().count(CellType::Insect), 2);
        assert_eq!(world.grid.energy[4], 100);
    }

    #[test]
    fn test_insect_lands_on_leaf_and_restores_it_when_leaving() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(3, 1);
        insect(&mut world, 0, 200);
        leaf(&mut world, 1, 80);
        world.grid.water[1] = 9;
        let config = BiologyConfig {
            insect_move_chance: 1.0,
            insect_land_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        InsectBehavior::update(&mut world, 0, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[0], CellType::Air);
        assert_eq!(world.grid.cell_type[1], CellType::Insect);
        assert_eq!(world.grid.energy[1], 200);
        let record = world.grid.metadata[1].insect().copied().expect("insect record");
        assert!(record.on_plant);
        assert_eq!(record.saved_plant.map(|p| (p.state, p.energy)), Some((PlantState::Leaf, 80)));

        assert!(InsectBehavior::move_insect(&mut world, 1, 2, &config, &mut rng));
        assert_eq!(world.grid.plant_state(1), Some(PlantState::Leaf));
        assert_eq!(world.grid.energy[1], 80);
        assert_eq!(world.grid.water[1], 9);
        let record = world.grid.metadata[2].insect().copied().expect("insect record");
        assert!(!record.on_plant);
        assert_eq!(record.saved_plant, None);
    }

    #[test]
    fn test_insect_does_not_walk_into_soil() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(5);
        let mut world = world(2, 1);
        insect(&mut world, 0, 200);
        world.grid.set_cell(1, CellType::Soil, 0);
        world.begin_tick();
        assert!(!InsectBehavior::move_insect(&mut world, 0, 1, &calm(), &mut rng));
        assert_eq!(world.grid.cell_type[1], CellType::Soil);
    }
}
