//! Plant growth: roots, stems, leaves and flowers

use terrarium_simulation::{CellType, Metadata, PlantState};

use super::{is_stressed, transform, vacate};
use crate::config::BiologyConfig;
use crate::simulation::physics::refresh_soil_state;
use crate::world::rng_trait::weighted_choice;
use crate::world::{Resource, SimStats, WorldRng, WorldState};

/// Root growth directions and weights: down, down-diagonals, sides
const ROOT_GROWTH: [(i32, i32, f32); 5] = [
    (0, 1, 0.5),
    (-1, 1, 0.15),
    (1, 1, 0.15),
    (-1, 0, 0.1),
    (1, 0, 0.1),
];

/// Stem growth directions and weights: up, up-diagonals
const STEM_GROWTH: [(i32, i32, f32); 3] = [(0, -1, 0.7), (-1, -1, 0.15), (1, -1, 0.15)];

/// Radius searched when counting roots under a sprouting stem
const ROOT_MASS_RADIUS: i32 = 3;

/// Resources given to freshly grown tissue
const NEW_TISSUE_WATER: u8 = 10;

pub struct PlantGrowth;

impl PlantGrowth {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        let Some(state) = world.grid.plant_state(index) else {
            log::warn!(
                "Plant at {} has invalid state {}, resetting to root",
                index,
                world.grid.state[index]
            );
            world.grid.state[index] = PlantState::Root.as_u8();
            world.activate(index);
            return;
        };

        if !Self::metabolize(world, index, config, rng, stats) {
            return;
        }

        match state {
            PlantState::Root => Self::update_root(world, index, config, rng),
            PlantState::Stem => Self::update_stem(world, index, config, rng),
            PlantState::Leaf => Self::update_leaf(world, index, config),
            PlantState::Flower => Self::update_flower(world, index, config, rng, stats),
        }
        world.activate(index);
    }

    /// Burn energy; returns false if the tissue died
    fn metabolize<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let energy = world.grid.energy[index];
        let mut cost = 0u8;
        if rng.check_probability(config.metabolism_chance) {
            cost = cost.saturating_add((energy / 100).max(1));
        }
        if world.grid.water[index] == 0 {
            cost = cost.saturating_add(1);
        }
        if is_stressed(world, index, config) {
            cost = cost.saturating_add(1);
        }
        if world.grid.water[index] > 0 && rng.check_probability(config.water_use_chance) {
            world.grid.water[index] -= 1;
        }

        world.grid.energy[index] = energy.saturating_sub(cost);
        if world.grid.energy[index] > 0 {
            return true;
        }

        // Nutrients stay in the dead matter
        transform(world, index, CellType::DeadMatter, 0);
        stats.record_death();
        false
    }

    fn update_root<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) {
        Self::absorb(world, index, config);

        if let Some(above) = world.grid.above(index)
            && world.grid.cell_type[above] == CellType::Plant
        {
            Self::share_upward(world, index, above, config);
        }

        // Roots turn nutrients into energy
        if world.grid.nutrient[index] > 0 && world.grid.energy[index] < config.root_energy_cap {
            world.grid.nutrient[index] -= 1;
            world.grid.energy[index] += 1;
        }

        if world.grid.energy[index] >= config.root_growth_energy
            && rng.check_probability(config.root_growth_chance)
        {
            Self::grow_root(world, index, config, rng);
        }

        Self::sprout_stem(world, index, config, rng);
    }

    /// Draw water and nutrients from soil, water and air around a root
    fn absorb(world: &mut WorldState, index: usize, config: &BiologyConfig) {
        for neighbor in world.grid.neighbors_of(index) {
            let n = neighbor.index;
            let cell_type = world.grid.cell_type[n];
            if !matches!(cell_type, CellType::Soil | CellType::Water | CellType::Air) {
                continue;
            }
            for resource in [Resource::Water, Resource::Nutrient] {
                world.grid.transfer(
                    resource,
                    n,
                    index,
                    config.root_uptake,
                    config.transfer_loss,
                    u8::MAX,
                );
            }
            match cell_type {
                CellType::Soil => refresh_soil_state(&mut world.grid, n),
                CellType::Water if world.grid.water[n] == 0 => vacate(world, n),
                _ => {}
            }
        }
    }

    /// Push half of the water and nutrient difference to the plant cell above
    fn share_upward(world: &mut WorldState, from: usize, to: usize, config: &BiologyConfig) {
        for resource in [Resource::Water, Resource::Nutrient] {
            let channel = world.grid.channel(resource);
            let (have, other) = (channel[from], channel[to]);
            if have > other {
                let amount = (have - other) / 2;
                world
                    .grid
                    .transfer(resource, from, to, amount, config.transfer_loss, u8::MAX);
            }
        }
        world.activate(to);
    }

    fn grow_root<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) {
        let mut targets = Vec::with_capacity(ROOT_GROWTH.len());
        let mut weights = Vec::with_capacity(ROOT_GROWTH.len());
        for (dx, dy, weight) in ROOT_GROWTH {
            if let Some(target) = world.grid.offset(index, dx, dy)
                && world.grid.cell_type[target] == CellType::Soil
            {
                targets.push(target);
                weights.push(weight);
            }
        }
        let Some(choice) = weighted_choice(&weights, rng) else {
            return;
        };
        let target = targets[choice];

        // The root keeps the soil's water and nutrients
        world.grid.energy[index] -= config.root_growth_energy / 2;
        transform(world, target, CellType::Plant, PlantState::Root.as_u8());
        world.grid.energy[target] = config.root_growth_energy / 4;
    }

    fn sprout_stem<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) {
        let Some(above) = world.grid.above(index) else {
            return;
        };
        if world.grid.cell_type[above] != CellType::Air
            || world.grid.energy[index] < config.stem_sprout_energy
            || !rng.check_probability(config.stem_sprout_chance)
            || Self::count_roots(world, index) < config.root_mass_for_stem
        {
            return;
        }

        world.grid.energy[index] -= config.stem_sprout_energy / 2;
        Self::new_tissue(world, index, above, PlantState::Stem, 1, config.stem_sprout_energy / 4);
    }

    fn count_roots(world: &WorldState, index: usize) -> usize {
        let Some((x, y)) = world.grid.coords(index) else {
            return 0;
        };
        let mut count = 0;
        for dy in -ROOT_MASS_RADIUS..=ROOT_MASS_RADIUS {
            for dx in -ROOT_MASS_RADIUS..=ROOT_MASS_RADIUS {
                if let Some(i) = world.grid.index(x as i32 + dx, y as i32 + dy)
                    && world.grid.plant_state(i) == Some(PlantState::Root)
                {
                    count += 1;
                }
            }
        }
        count
    }

    fn update_stem<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
    ) {
        let height = world.grid.metadata[index].counter();

        if let Some(above) = world.grid.above(index)
            && world.grid.cell_type[above] == CellType::Plant
        {
            Self::share_upward(world, index, above, config);
        }

        let is_tip = STEM_GROWTH.iter().all(|&(dx, dy, _)| {
            world
                .grid
                .offset(index, dx, dy)
                .is_none_or(|i| world.grid.cell_type[i] != CellType::Plant)
        });

        if is_tip
            && height < config.max_stem_height
            && world.grid.energy[index] >= config.stem_growth_energy
            && rng.check_probability(config.stem_growth_chance)
        {
            Self::grow_stem(world, index, height, config, rng);
        }

        if world.grid.energy[index] >= config.leaf_sprout_energy
            && rng.check_probability(config.leaf_sprout_chance)
        {
            let side = rng.gen_sign();
            if let Some(target) = world.grid.offset(index, side, 0)
                && world.grid.cell_type[target] == CellType::Air
            {
                world.grid.energy[index] -= config.leaf_sprout_energy / 2;
                Self::new_tissue(world, index, target, PlantState::Leaf, 0, config.leaf_sprout_energy / 4);
            }
        }

        let flower_ready = height >= config.flower_min_height
            && world.grid.energy[index] >= config.flower_min_energy
            && world
                .grid
                .above(index)
                .is_some_and(|a| world.grid.cell_type[a] == CellType::Air);
        if flower_ready && rng.check_probability(config.flower_chance) {
            // Energy and resources carry over; the seed counter starts at zero
            world.grid.set_cell(index, CellType::Plant, PlantState::Flower.as_u8());
            world.activate_area(index);
        }
    }

    fn grow_stem<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        height: u8,
        config: &BiologyConfig,
        rng: &mut R,
    ) {
        let mut targets = Vec::with_capacity(STEM_GROWTH.len());
        let mut weights = Vec::with_capacity(STEM_GROWTH.len());
        for (dx, dy, weight) in STEM_GROWTH {
            if let Some(target) = world.grid.offset(index, dx, dy)
                && world.grid.cell_type[target] == CellType::Air
            {
                targets.push(target);
                weights.push(weight);
            }
        }
        let Some(choice) = weighted_choice(&weights, rng) else {
            return;
        };

        world.grid.energy[index] -= config.stem_growth_energy / 2;
        Self::new_tissue(
            world,
            index,
            targets[choice],
            PlantState::Stem,
            height.saturating_add(1),
            config.stem_growth_energy / 4,
        );
    }

    fn update_leaf(world: &mut WorldState, index: usize, config: &BiologyConfig) {
        if world.grid.water[index] > 0 {
            let gain = (config.photosynthesis_rate * world.forcing.daylight).round() as u8;
            let energy = world.grid.energy[index];
            world.grid.energy[index] = energy.saturating_add(gain).min(config.leaf_energy_cap.max(energy));
        }

        let energy = world.grid.energy[index];
        if energy <= config.leaf_share_threshold {
            return;
        }
        let neediest = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| world.grid.cell_type[n] == CellType::Plant && world.grid.energy[n] < energy)
            .min_by_key(|&n| world.grid.energy[n]);
        if let Some(target) = neediest {
            let surplus = energy - config.leaf_share_threshold;
            world.grid.transfer(
                Resource::Energy,
                index,
                target,
                surplus,
                config.transfer_loss,
                u8::MAX,
            );
            world.activate(target);
        }
    }

    fn update_flower<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        let made = world.grid.metadata[index].counter();
        if made >= config.max_seeds_per_flower
            || world.grid.energy[index] < config.seed_energy_cost
            || !rng.check_probability(config.flower_seed_chance)
        {
            return;
        }

        let free: Vec<usize> = world
            .grid
            .neighbors_of(index)
            .iter()
            .map(|n| n.index)
            .filter(|&n| world.grid.cell_type[n] == CellType::Air)
            .collect();
        if free.is_empty() {
            return;
        }
        let target = free[rng.gen_index(free.len())];

        world.grid.energy[index] -= config.seed_energy_cost;
        world.grid.metadata[index].bump(1);
        transform(world, target, CellType::Seed, 0);
        world.grid.energy[target] = config.seed_initial_energy;
        stats.record_birth();
    }

    /// Grow a new plant cell from `parent` into `target`
    fn new_tissue(
        world: &mut WorldState,
        parent: usize,
        target: usize,
        state: PlantState,
        height: u8,
        energy: u8,
    ) {
        transform(world, target, CellType::Plant, state.as_u8());
        world.grid.metadata[target] = Metadata::Counter(height);
        world.grid.energy[target] = energy;
        let water = world.grid.water[parent].min(NEW_TISSUE_WATER);
        world.grid.water[parent] -= water;
        world.grid.water[target] = water;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::NoopStats;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use terrarium_simulation::SoilState;

    fn world(width: usize, height: usize) -> WorldState {
        let mut config = SimConfig::quiet();
        config.grid.width = width;
        config.grid.height = height;
        WorldState::new(&config)
    }

    fn calm() -> BiologyConfig {
        BiologyConfig {
            metabolism_chance: 0.0,
            water_use_chance: 0.0,
            root_growth_chance: 0.0,
            stem_sprout_chance: 0.0,
            stem_growth_chance: 0.0,
            leaf_sprout_chance: 0.0,
            flower_chance: 0.0,
            flower_seed_chance: 0.0,
            ..BiologyConfig::default()
        }
    }

    fn place(world: &mut WorldState, index: usize, state: PlantState, energy: u8, water: u8) {
        world.grid.set_cell(index, CellType::Plant, state.as_u8());
        world.grid.energy[index] = energy;
        world.grid.water[index] = water;
    }

    #[test]
    fn test_starved_plant_becomes_dead_matter() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        place(&mut world, 4, PlantState::Stem, 1, 0);
        world.grid.nutrient[4] = 33;

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[4], CellType::DeadMatter);
        assert_eq!(world.grid.nutrient[4], 33);
        assert_eq!(world.grid.metadata[4], Metadata::Counter(0));
    }

    #[test]
    fn test_root_absorbs_from_soil() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        for i in 0..9 {
            world.grid.set_cell(i, CellType::Soil, SoilState::Wet.as_u8());
            world.grid.water[i] = 100;
            world.grid.nutrient[i] = 50;
        }
        place(&mut world, 4, PlantState::Root, 50, 0);
        world.grid.nutrient[4] = 0;

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert!(world.grid.water[4] > 0);
        // One nutrient already turned into energy
        assert!(world.grid.nutrient[4] > 0);
        assert!(world.grid.energy[4] > 49);
        assert!(world.grid.water[0] < 100);
    }

    #[test]
    fn test_root_shares_with_stem_above() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(1, 3);
        place(&mut world, 1, PlantState::Stem, 50, 0);
        place(&mut world, 2, PlantState::Root, 50, 100);

        world.begin_tick();
        PlantGrowth::update(&mut world, 2, &calm(), &mut rng, &mut NoopStats);
        assert!(world.grid.water[1] > 0);
        assert!(world.grid.water[2] < 100);
    }

    #[test]
    fn test_root_grows_into_soil() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        for i in 3..9 {
            world.grid.set_cell(i, CellType::Soil, SoilState::Dry.as_u8());
        }
        place(&mut world, 4, PlantState::Root, 200, 50);
        let config = BiologyConfig {
            root_growth_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        let roots = (0..9)
            .filter(|&i| world.grid.plant_state(i) == Some(PlantState::Root))
            .count();
        assert_eq!(roots, 2);
    }

    #[test]
    fn test_stem_sprouts_with_enough_roots() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(5, 5);
        for i in 10..25 {
            place(&mut world, i, PlantState::Root, 10, 10);
        }
        let top = 12;
        world.grid.energy[top] = 200;
        let config = BiologyConfig {
            stem_sprout_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        PlantGrowth::update(&mut world, top, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.plant_state(7), Some(PlantState::Stem));
        assert_eq!(world.grid.metadata[7], Metadata::Counter(1));
        assert!(world.is_bio_processed(7));
    }

    #[test]
    fn test_tall_stem_flowers() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        place(&mut world, 4, PlantState::Stem, 200, 50);
        world.grid.metadata[4] = Metadata::Counter(10);
        let config = BiologyConfig {
            flower_chance: 1.0,
            ..calm()
        };

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.plant_state(4), Some(PlantState::Flower));
        assert_eq!(world.grid.energy[4], 200);
        assert_eq!(world.grid.metadata[4], Metadata::Counter(0));
    }

    #[test]
    fn test_leaf_photosynthesis_needs_light_and_water() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        place(&mut world, 4, PlantState::Leaf, 50, 10);
        world.forcing.daylight = 1.0;

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.energy[4], 54);

        world.forcing.daylight = 0.0;
        PlantGrowth::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.energy[4], 54);
    }

    #[test]
    fn test_leaf_shares_surplus() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(3, 3);
        place(&mut world, 4, PlantState::Leaf, 180, 10);
        place(&mut world, 5, PlantState::Stem, 20, 10);
        world.forcing.daylight = 0.0;

        world.begin_tick();
        PlantGrowth::update(&mut world, 4, &calm(), &mut rng, &mut NoopStats);
        assert_eq!(world.grid.energy[4], 100);
        assert!(world.grid.energy[5] > 20);
        assert!((world.grid.energy[5] as u32) < 20 + 80);
    }

    #[test]
    fn test_flower_makes_limited_seeds() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let mut world = world(5, 5);
        place(&mut world, 12, PlantState::Flower, 255, 50);
        let config = BiologyConfig {
            flower_seed_chance: 1.0,
            seed_energy_cost: 10,
            ..calm()
        };

        for _ in 0..10 {
            world.begin_tick();
            PlantGrowth::update(&mut world, 12, &config, &mut rng, &mut NoopStats);
        }
        assert_eq!(world.census().count(CellType::Seed), 3);
        assert_eq!(world.grid.metadata[12], Metadata::Counter(3));
    }
}
