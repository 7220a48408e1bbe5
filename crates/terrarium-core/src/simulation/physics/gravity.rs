//! Gravity for loose solids and creatures

use terrarium_simulation::CellType;

use crate::config::PhysicsConfig;
use crate::simulation::stuck::{Escalation, StuckLadder};
use crate::world::{SimStats, WorldRng, WorldState};

/// Rows below ground level where a seed can still burrow
const BURROW_DEPTH: i32 = 3;

pub struct Gravity;

impl Gravity {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> usize {
        let ladder = StuckLadder::gravity(config);
        let mut moved = 0;
        for &index in snapshot {
            if world.is_processed(index) {
                continue;
            }
            let cell_type = world.grid.cell_type[index];
            if !Self::affected(world, index, cell_type, config) {
                continue;
            }
            if cell_type == CellType::Insect && rng.check_probability(config.insect_flight_chance) {
                // Flying this tick
                continue;
            }
            if Self::fall(world, index, cell_type, config, &ladder, rng, stats) {
                moved += 1;
            }
        }

        if world.tick() % config.gravity_sweep_interval == 0 {
            Self::sweep(world, config);
        }
        moved
    }

    /// Whether gravity acts on this cell at all
    fn affected(
        world: &WorldState,
        index: usize,
        cell_type: CellType,
        config: &PhysicsConfig,
    ) -> bool {
        match cell_type {
            CellType::Seed | CellType::DeadMatter | CellType::Worm => true,
            CellType::Insect => !world.grid.metadata[index]
                .insect()
                .is_some_and(|insect| insect.on_plant),
            CellType::Soil => config.soil_gravity,
            _ => false,
        }
    }

    /// Types whose metadata counter is a stuck counter
    fn tracks_stuck(cell_type: CellType) -> bool {
        matches!(cell_type, CellType::Seed | CellType::Worm | CellType::Soil)
    }

    fn sink_chance(cell_type: CellType) -> f32 {
        match cell_type {
            CellType::Soil => 0.8,
            CellType::Worm => 0.6,
            CellType::DeadMatter => 0.5,
            CellType::Seed => 0.3,
            CellType::Insect => 0.2,
            _ => 0.0,
        }
    }

    fn fall<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        cell_type: CellType,
        config: &PhysicsConfig,
        ladder: &StuckLadder,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) -> bool {
        let tracks = Self::tracks_stuck(cell_type);
        let stuck = if tracks {
            world.grid.metadata[index].counter()
        } else {
            0
        };

        let Some(below) = world.grid.below(index) else {
            if tracks {
                world.grid.metadata[index].reset();
            }
            return false;
        };

        if !world.is_processed(below) {
            match world.grid.cell_type[below] {
                CellType::Air => return Self::move_to(world, index, below, tracks, stats),
                CellType::Water if rng.check_probability(Self::sink_chance(cell_type)) => {
                    return Self::move_to(world, index, below, tracks, stats);
                }
                CellType::Soil
                    if cell_type == CellType::Seed
                        && world.depth(below).abs() <= BURROW_DEPTH
                        && rng.check_probability(config.seed_burrow_chance) =>
                {
                    return Self::move_to(world, index, below, tracks, stats);
                }
                _ => {}
            }
        }

        let diagonal_chance = (config.diagonal_base + stuck as f32 * config.diagonal_step).min(1.0);
        let first = rng.gen_sign();
        let open_diagonals: Vec<usize> = [first, -first]
            .iter()
            .filter_map(|&dx| world.grid.offset(index, dx, 1))
            .filter(|&i| Self::is_open(world, i))
            .collect();

        if !open_diagonals.is_empty() && rng.check_probability(diagonal_chance) {
            return Self::move_to(world, index, open_diagonals[0], tracks, stats);
        }

        let below_open = matches!(world.grid.cell_type[below], CellType::Air | CellType::Water);
        if !below_open && open_diagonals.is_empty() {
            // Resting on something solid
            if tracks {
                world.grid.metadata[index].reset();
            }
            return false;
        }

        if tracks {
            world.grid.metadata[index].bump(1);
        }
        if ladder.action(stuck) >= Escalation::Force {
            let open: Vec<usize> = world
                .grid
                .neighbors_of(index)
                .iter()
                .map(|n| n.index)
                .filter(|&i| Self::is_open(world, i))
                .collect();
            if !open.is_empty() {
                let target = open[rng.gen_index(open.len())];
                return Self::move_to(world, index, target, tracks, stats);
            }
        }
        world.activate(index);
        false
    }

    fn is_open(world: &WorldState, index: usize) -> bool {
        world.grid.cell_type[index] == CellType::Air && !world.is_processed(index)
    }

    fn move_to(
        world: &mut WorldState,
        from: usize,
        to: usize,
        tracks: bool,
        stats: &mut dyn SimStats,
    ) -> bool {
        if !world.relocate(from, to) {
            return false;
        }
        if tracks {
            world.grid.metadata[to].reset();
        }
        stats.record_pixel_moved();
        true
    }

    /// Wake unsupported falling cells in the chunks touched this tick
    fn sweep(world: &mut WorldState, config: &PhysicsConfig) {
        let width = world.grid.width();
        let unsupported: Vec<usize> = world
            .chunks
            .active_chunks()
            .flat_map(|chunk| chunk.indices(width))
            .filter(|&i| {
                let cell_type = world.grid.cell_type[i];
                (cell_type.is_falling() || (config.soil_gravity && cell_type == CellType::Soil))
                    && Self::affected(world, i, cell_type, config)
                    && world
                        .grid
                        .below(i)
                        .is_some_and(|b| world.grid.cell_type[b] == CellType::Air)
            })
            .collect();
        if !unsupported.is_empty() {
            log::trace!("Gravity sweep woke {} unsupported cells", unsupported.len());
        }
        for index in unsupported {
            world.activate(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::NoopStats;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use terrarium_simulation::{InsectState, Metadata, PlantSnapshot, PlantState};

    fn world(width: usize, height: usize) -> (WorldState, PhysicsConfig) {
        let mut config = SimConfig::quiet();
        config.grid.width = width;
        config.grid.height = height;
        (WorldState::new(&config), config.physics)
    }

    #[test]
    fn test_seed_falls_straight_down() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, config) = world(3, 5);
        world.grid.set_cell(1, CellType::Seed, 0);
        world.grid.energy[1] = 40;

        world.begin_tick();
        Gravity::update(&mut world, &[1], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[4], CellType::Seed);
        assert_eq!(world.grid.energy[4], 40);
        assert_eq!(world.grid.cell_type[1], CellType::Air);
    }

    #[test]
    fn test_dead_matter_keeps_progress_while_falling() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, config) = world(1, 3);
        world.grid.set_cell(0, CellType::DeadMatter, 0);
        world.grid.metadata[0] = Metadata::Counter(42);

        world.begin_tick();
        Gravity::update(&mut world, &[0], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[1], CellType::DeadMatter);
        assert_eq!(world.grid.metadata[1], Metadata::Counter(42));
    }

    #[test]
    fn test_soil_is_static_by_default() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, mut config) = world(1, 3);
        world.grid.set_cell(0, CellType::Soil, 0);

        world.begin_tick();
        Gravity::update(&mut world, &[0], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[0], CellType::Soil);

        config.soil_gravity = true;
        Gravity::update(&mut world, &[0], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[1], CellType::Soil);
    }

    #[test]
    fn test_clinging_insect_does_not_fall() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, mut config) = world(1, 3);
        config.insect_flight_chance = 0.0;
        world.grid.set_cell(0, CellType::Insect, 0);
        world.grid.metadata[0] = Metadata::Insect(InsectState {
            starvation: 0,
            on_plant: true,
            saved_plant: Some(PlantSnapshot {
                state: PlantState::Leaf,
                water: 0,
                nutrient: 0,
                energy: 10,
                counter: 0,
            }),
        });

        world.begin_tick();
        Gravity::update(&mut world, &[0], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[0], CellType::Insect);
    }

    #[test]
    fn test_grounded_insect_falls_when_not_flying() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, mut config) = world(1, 3);
        config.insect_flight_chance = 0.0;
        world.grid.set_cell(0, CellType::Insect, 0);

        world.begin_tick();
        Gravity::update(&mut world, &[0], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[1], CellType::Insect);
    }

    #[test]
    fn test_resting_seed_resets_counter() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, mut config) = world(3, 3);
        config.seed_burrow_chance = 0.0;
        for x in 0..3 {
            world.grid.set_cell(2 * 3 + x, CellType::Soil, 0);
        }
        let seed = 3 + 1;
        world.grid.set_cell(seed, CellType::Seed, 0);
        world.grid.metadata[seed] = Metadata::Counter(4);

        world.begin_tick();
        Gravity::update(&mut world, &[seed], &config, &mut rng, &mut NoopStats);
        assert_eq!(world.grid.cell_type[seed], CellType::Seed);
        assert_eq!(world.grid.metadata[seed], Metadata::Counter(0));
        assert!(!world.pending().contains(seed));
    }

    #[test]
    fn test_sweep_wakes_unsupported_cells() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        let (mut world, mut config) = world(4, 4);
        config.gravity_sweep_interval = 1;
        world.grid.set_cell(1, CellType::DeadMatter, 0);
        world.begin_tick();
        // Something else touched the chunk this tick
        world.activate(0);
        Gravity::update(&mut world, &[], &config, &mut rng, &mut NoopStats);
        assert!(world.pending().contains(1));
    }
}
