use crate::config::EnvironmentConfig;
use crate::world::WorldState;
use crate::world::forcing::TEMPERATURE_CELL_SIZE;

use super::weather::cloud_rows;

pub struct TemperatureModel;

impl TemperatureModel {
    /// Recompute every coarse temperature cell from daylight, clouds and depth
    pub fn update(world: &mut WorldState, config: &EnvironmentConfig) {
        let height = world.grid.height();
        let ground = world.ground_level();
        let cover = Self::cloud_cover(world, config);
        let sunny = config.base_temperature
            + config.temperature_offset
            + config.day_swing * world.forcing.daylight;
        let underground = config.underground_temperature + config.temperature_offset;

        let field = &mut world.forcing.temperature;
        for cy in 0..field.rows() {
            let y = (cy * TEMPERATURE_CELL_SIZE + TEMPERATURE_CELL_SIZE / 2)
                .min(height.saturating_sub(1));
            for cx in 0..field.cols() {
                let value = if y < ground {
                    sunny - config.cloud_shading * cover[cx]
                } else {
                    underground
                };
                field.set_cell(cx, cy, value);
            }
        }
    }

    /// Mean cloud density in [0, 1] above each temperature column
    fn cloud_cover(world: &WorldState, config: &EnvironmentConfig) -> Vec<f32> {
        let grid = &world.grid;
        let width = grid.width();
        let rows = cloud_rows(grid.height(), config);
        let cols = world.forcing.temperature.cols();
        let mut cover = vec![0.0; cols];
        if rows == 0 {
            return cover;
        }

        for (cx, slot) in cover.iter_mut().enumerate() {
            let x0 = cx * TEMPERATURE_CELL_SIZE;
            let x1 = (x0 + TEMPERATURE_CELL_SIZE).min(width);
            let mut sum = 0u32;
            for y in 0..rows {
                for x in x0..x1 {
                    sum += grid.cloud[y * width + x] as u32;
                }
            }
            let cells = ((x1 - x0) * rows).max(1);
            *slot = sum as f32 / (cells as f32 * 255.0);
        }
        cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    fn world() -> (WorldState, EnvironmentConfig) {
        let mut config = SimConfig::quiet();
        config.grid.width = 16;
        config.grid.height = 32;
        config.grid.ground_level_ratio = 0.5;
        (WorldState::new(&config), config.environment)
    }

    #[test]
    fn test_surface_is_warmer_at_noon() {
        let (mut world, config) = world();
        world.forcing.daylight = 1.0;
        TemperatureModel::update(&mut world, &config);
        let surface = world.forcing.temperature.cell(0, 0);
        let deep = world.forcing.temperature.cell(0, 3);
        assert!((surface - (config.base_temperature + config.day_swing)).abs() < 1e-4);
        assert!((deep - config.underground_temperature).abs() < 1e-4);

        world.forcing.daylight = 0.0;
        TemperatureModel::update(&mut world, &config);
        assert!(world.forcing.temperature.cell(0, 0) < surface);
        assert_eq!(world.forcing.temperature.cell(0, 3), deep);
    }

    #[test]
    fn test_clouds_shade_the_ground() {
        let (mut world, config) = world();
        world.forcing.daylight = 1.0;
        let width = world.grid.width();
        // Overcast over the left column of temperature cells only
        for y in 0..cloud_rows(world.grid.height(), &config) {
            for x in 0..8 {
                world.grid.cloud[y * width + x] = 255;
            }
        }
        TemperatureModel::update(&mut world, &config);
        let shaded = world.forcing.temperature.cell(0, 0);
        let clear = world.forcing.temperature.cell(1, 0);
        assert!((clear - shaded - config.cloud_shading).abs() < 1e-4);
    }

    #[test]
    fn test_offset_shifts_everything() {
        let (mut world, mut config) = world();
        TemperatureModel::update(&mut world, &config);
        let before = world.forcing.temperature.mean();
        config.temperature_offset = 5.0;
        TemperatureModel::update(&mut world, &config);
        assert!((world.forcing.temperature.mean() - before - 5.0).abs() < 1e-4);
    }
}
