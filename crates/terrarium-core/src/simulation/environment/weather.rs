//! Wind, clouds and rain

use terrarium_simulation::CellType;

use crate::config::EnvironmentConfig;
use crate::world::{Grid, Wind, WorldRng, WorldState};

/// Radius range of a freshly spawned cloud blob
const CLOUD_RADIUS: (i32, i32) = (2, 5);
/// Density at the center of a new blob
const CLOUD_CORE_DENSITY: u8 = 180;
/// Density lost per cell of distance from the blob center
const CLOUD_FALLOFF: u8 = 25;

/// Rows at the top of the grid where clouds live
pub fn cloud_rows(height: usize, config: &EnvironmentConfig) -> usize {
    ((height as f32 * config.cloud_band_ratio).round() as usize).min(height)
}

pub struct Weather;

impl Weather {
    /// Advance wind, clouds and rain; returns the number of raindrops spawned
    pub fn update<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) -> usize {
        Self::update_wind(&mut world.forcing.wind, config, rng);

        let rows = cloud_rows(world.grid.height(), config);
        if rows == 0 {
            return 0;
        }

        if rng.check_probability(config.cloud_spawn_chance) {
            Self::spawn_cloud(&mut world.grid, rows, rng);
        }
        if world.tick() % config.cloud_drift_interval.max(1) == 0 {
            Self::drift_clouds(&mut world.grid, rows, world.forcing.wind);
        }
        Self::thin_clouds(&mut world.grid, rows, config, rng);

        Self::toggle_rain(world, config, rng);
        if world.forcing.raining {
            Self::rain(world, rows, config, rng)
        } else {
            0
        }
    }

    fn update_wind<R: WorldRng + ?Sized>(
        wind: &mut Wind,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) {
        let step = config.wind_variability;
        wind.direction = (wind.direction + (rng.gen_f32() * 2.0 - 1.0) * step).clamp(-1.0, 1.0);
        wind.strength = (wind.strength + (rng.gen_f32() * 2.0 - 1.0) * step).clamp(0.0, 1.0);
    }

    /// Add a roughly round blob of cloud somewhere in the band
    fn spawn_cloud<R: WorldRng + ?Sized>(grid: &mut Grid, rows: usize, rng: &mut R) {
        let cx = rng.gen_index(grid.width()) as i32;
        let cy = rng.gen_index(rows) as i32;
        let radius = rng.gen_range_i32(CLOUD_RADIUS.0, CLOUD_RADIUS.1);

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                if distance > radius as f32 {
                    continue;
                }
                let y = cy + dy;
                if y < 0 || y >= rows as i32 {
                    continue;
                }
                let Some(index) = grid.index(cx + dx, y) else {
                    continue;
                };
                let density =
                    CLOUD_CORE_DENSITY.saturating_sub(CLOUD_FALLOFF.saturating_mul(distance as u8));
                grid.cloud[index] = grid.cloud[index].saturating_add(density);
            }
        }
    }

    /// Shift every cloud row one column downwind, wrapping around the edges
    fn drift_clouds(grid: &mut Grid, rows: usize, wind: Wind) {
        let width = grid.width();
        let step = wind.drift_step();
        for y in 0..rows {
            let row = &mut grid.cloud[y * width..(y + 1) * width];
            if step > 0 {
                row.rotate_right(1);
            } else {
                row.rotate_left(1);
            }
        }
    }

    fn thin_clouds<R: WorldRng + ?Sized>(
        grid: &mut Grid,
        rows: usize,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) {
        let band = rows * grid.width();
        for density in grid.cloud[..band].iter_mut() {
            if *density > 0 && rng.check_probability(config.cloud_decay_chance) {
                *density -= 1;
            }
        }
    }

    fn toggle_rain<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) {
        let forcing = &mut world.forcing;
        if forcing.raining && rng.check_probability(config.rain_stop_chance) {
            forcing.raining = false;
            log::debug!("Rain stopped at tick {}", forcing.tick);
        } else if !forcing.raining && rng.check_probability(config.rain_start_chance) {
            forcing.raining = true;
            log::debug!("Rain started at tick {}", forcing.tick);
        }
    }

    /// Sample one cloud cell per column; dense ones drop water below the band
    fn rain<R: WorldRng + ?Sized>(
        world: &mut WorldState,
        rows: usize,
        config: &EnvironmentConfig,
        rng: &mut R,
    ) -> usize {
        let width = world.grid.width();
        if rows >= world.grid.height() {
            return 0;
        }

        let mut drops = 0;
        for x in 0..width {
            let y = rng.gen_index(rows);
            let cloud = y * width + x;
            if world.grid.cloud[cloud] < config.rain_cloud_density
                || !rng.check_probability(config.rain_chance)
            {
                continue;
            }
            let target = rows * width + x;
            if world.grid.cell_type[target] != CellType::Air {
                continue;
            }

            world.grid.set_cell(target, CellType::Water, 0);
            world.grid.water[target] = config.raindrop_water;
            world.activate(target);
            let thinned = world.grid.cloud[cloud].saturating_sub(config.raindrop_water / 2);
            world.grid.cloud[cloud] = thinned;
            drops += 1;
        }
        drops
    }
}
