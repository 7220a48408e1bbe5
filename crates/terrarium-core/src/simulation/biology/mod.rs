//! Biology rule engine
//!
//! Runs after physics over the cells active at the start of the tick plus every
//! cell physics queued since, so organisms that just moved are still evaluated.
//! Each cell is evaluated at most once per tick.

mod decomposition;
mod insect;
mod plant;
mod seed;
mod worm;

pub use decomposition::{DECOMPOSED, Decomposition};
pub use insect::InsectBehavior;
pub use plant::PlantGrowth;
pub use seed::SeedLife;
pub use worm::WormBehavior;

use terrarium_simulation::CellType;

use crate::config::BiologyConfig;
use crate::world::{SimStats, WorldRng, WorldState};

pub struct Biology;

impl Biology {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        config: &BiologyConfig,
        rng: &mut R,
        stats: &mut dyn SimStats,
    ) {
        let mut cells: Vec<usize> = world.active().as_slice().to_vec();
        cells.extend(
            world
                .pending()
                .iter()
                .filter(|&i| !world.active().contains(i)),
        );

        let mut evaluated = 0;
        for index in cells {
            if world.is_bio_processed(index) {
                continue;
            }
            world.mark_bio_processed(index);

            match world.grid.cell_type[index] {
                CellType::Plant => PlantGrowth::update(world, index, config, rng, stats),
                CellType::Seed => SeedLife::update(world, index, config, rng, stats),
                CellType::Insect => InsectBehavior::update(world, index, config, rng, stats),
                CellType::Worm => WormBehavior::update(world, index, config, rng, stats),
                CellType::DeadMatter => {
                    Decomposition::update(world, index, config, stats);
                }
                CellType::Air | CellType::Water | CellType::Soil => continue,
            }
            evaluated += 1;
        }

        log::trace!("Biology tick {}: {} organisms", world.tick(), evaluated);
    }
}

/// Whether the local temperature is outside the comfortable range
pub(crate) fn is_stressed(world: &WorldState, index: usize, config: &BiologyConfig) -> bool {
    let temperature = world.forcing.temperature_at(world.grid.width(), index);
    temperature >= config.heat_stress || temperature <= config.cold_stress
}

/// Biology conversion in place
pub(crate) fn transform(world: &mut WorldState, index: usize, cell_type: CellType, state: u8) {
    world.grid.set_cell(index, cell_type, state);
    world.mark_bio_processed(index);
    world.activate_area(index);
}

/// Biology conversion to empty AIR
pub(crate) fn vacate(world: &mut WorldState, index: usize) {
    world.grid.clear_cell(index);
    world.mark_bio_processed(index);
    world.activate_area(index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::world::CountingStats;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use terrarium_simulation::{Metadata, PlantState};

    fn world() -> (WorldState, BiologyConfig) {
        let mut config = SimConfig::quiet();
        config.grid.width = 6;
        config.grid.height = 6;
        (WorldState::new(&config), config.biology)
    }

    #[test]
    fn test_cells_queued_by_physics_are_evaluated() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let (mut world, config) = world();
        world.grid.set_cell(7, CellType::DeadMatter, 0);
        world.begin_tick();
        // Queued during the tick, e.g. after falling
        world.activate(7);

        Biology::update(&mut world, &config, &mut rng, &mut CountingStats::default());
        assert_eq!(world.grid.metadata[7], Metadata::Counter(1));
    }

    #[test]
    fn test_each_cell_evaluated_once() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let (mut world, config) = world();
        world.grid.set_cell(7, CellType::DeadMatter, 0);
        world.activate(7);
        world.begin_tick();
        // Also queued for the next tick
        world.activate(7);

        Biology::update(&mut world, &config, &mut rng, &mut CountingStats::default());
        assert_eq!(world.grid.metadata[7], Metadata::Counter(1));
    }

    #[test]
    fn test_living_cells_stay_active() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let (mut world, config) = world();
        world.grid.set_cell(20, CellType::Plant, PlantState::Stem.as_u8());
        world.grid.energy[20] = 100;
        world.grid.water[20] = 50;
        world.activate(20);

        world.begin_tick();
        Biology::update(&mut world, &config, &mut rng, &mut CountingStats::default());
        assert!(world.pending().contains(20));
    }

    #[test]
    fn test_deaths_are_counted() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(2);
        let (mut world, mut config) = world();
        config.seed_decay_chance = 1.0;
        world.grid.set_cell(20, CellType::Seed, 0);
        world.grid.energy[20] = 1;
        world.activate(20);
        let mut stats = CountingStats::default();

        world.begin_tick();
        Biology::update(&mut world, &config, &mut rng, &mut stats);
        assert_eq!(world.grid.cell_type[20], CellType::DeadMatter);
        assert_eq!(stats.deaths, 1);
    }

    #[test]
    fn test_stress_range() {
        let (mut world, config) = world();
        assert!(!is_stressed(&world, 0, &config));
        world.forcing.temperature.set_cell(0, 0, 45.0);
        assert!(is_stressed(&world, 0, &config));
        world.forcing.temperature.set_cell(0, 0, -10.0);
        assert!(is_stressed(&world, 0, &config));
    }
}
