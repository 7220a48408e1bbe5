//! Soil moisture diffusion and surface evaporation

use terrarium_simulation::{CellType, SoilState};

use crate::config::PhysicsConfig;
use crate::world::{Grid, Resource, WorldRng, WorldState, evaporation_factor};

/// Water a soil cell can hold
///
/// Soil close to the ground level drains freely; deeper soil holds less the
/// deeper it lies, scaled by its texture.
pub fn soil_capacity(world: &WorldState, index: usize, config: &PhysicsConfig) -> u8 {
    let depth = world.depth(index);
    if depth < config.surface_drainage_depth as i32 {
        return u8::MAX;
    }
    let base = (200 - 4 * depth).max(config.min_soil_capacity as i32) as f32;
    let texture = world
        .grid
        .soil_state(index)
        .map(SoilState::capacity_multiplier)
        .unwrap_or(1.0);
    (base * texture).round().clamp(0.0, 255.0) as u8
}

/// Flip WET/DRY soil to match its water level
pub fn refresh_soil_state(grid: &mut Grid, index: usize) {
    if let Some(state) = grid.soil_state(index)
        && state.tracks_moisture()
    {
        grid.state[index] = SoilState::for_moisture(grid.water[index]).as_u8();
    }
}

fn texture(grid: &Grid, index: usize) -> f32 {
    grid.soil_state(index)
        .map(SoilState::texture_multiplier)
        .unwrap_or(1.0)
}

/// Moves water from wet soil toward drier soil below and beside it
pub struct SoilMoisture;

impl SoilMoisture {
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        snapshot: &[usize],
        config: &PhysicsConfig,
        rng: &mut R,
    ) -> usize {
        let mut transfers = 0;
        for &index in snapshot {
            if world.is_processed(index) || world.grid.cell_type[index] != CellType::Soil {
                continue;
            }
            Self::evaporate(world, index, config, rng);
            transfers += Self::diffuse(world, index, config, rng);
        }
        transfers
    }

    fn evaporate<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &PhysicsConfig,
        rng: &mut R,
    ) {
        if world.grid.water[index] == 0 {
            return;
        }
        let exposed = world
            .grid
            .above(index)
            .is_some_and(|a| world.grid.cell_type[a] == CellType::Air);
        if !exposed {
            return;
        }
        let temperature = world.forcing.temperature_at(world.grid.width(), index);
        if rng.check_probability(config.soil_evaporation_chance * evaporation_factor(temperature)) {
            world.grid.water[index] -= 1;
            refresh_soil_state(&mut world.grid, index);
        }
    }

    fn diffuse<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        index: usize,
        config: &PhysicsConfig,
        rng: &mut R,
    ) -> usize {
        if world.grid.water[index] <= config.moisture_threshold {
            return 0;
        }

        let mut transfers = 0;
        if let Some(below) = world.grid.below(index)
            && Self::push(world, index, below, config.diffusion_rate, config)
        {
            transfers += 1;
        }

        if rng.check_probability(config.lateral_diffusion_chance) {
            let side = rng.gen_sign();
            if let Some(target) = world.grid.offset(index, side, 0)
                && Self::push(world, index, target, config.diffusion_rate * 0.5, config)
            {
                transfers += 1;
            }
        }

        if transfers > 0 {
            world.activate(index);
        }
        transfers
    }

    /// Push part of the moisture difference into a drier soil cell
    fn push(
        world: &mut WorldState,
        from: usize,
        to: usize,
        rate: f32,
        config: &PhysicsConfig,
    ) -> bool {
        if world.grid.cell_type[to] != CellType::Soil || world.is_processed(to) {
            return false;
        }
        let (source, target) = (world.grid.water[from], world.grid.water[to]);
        if target >= source {
            return false;
        }
        let diff = (source - target) as f32;
        let amount = (rate * diff * texture(&world.grid, from)).round().max(1.0) as u8;
        let cap = soil_capacity(world, to, config);
        let delivered = world
            .grid
            .transfer(Resource::Water, from, to, amount, config.transfer_loss, cap);
        if delivered == 0 {
            return false;
        }
        refresh_soil_state(&mut world.grid, from);
        refresh_soil_state(&mut world.grid, to);
        world.mark_processed(to);
        world.activate(to);
        true
    }
}
