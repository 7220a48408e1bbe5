//! Initial world generation
//!
//! Builds an uneven soil surface with texture bands and moisture that rises with
//! depth, then scatters ponds, plants, insects, worms and dead matter on it.

use fastnoise_lite::{FastNoiseLite, NoiseType};
use terrarium_simulation::{CellType, Metadata, PlantState, SoilState};

use super::grid::Grid;
use super::rng_trait::WorldRng;
use super::state::WorldState;
use crate::config::{GenerationConfig, SimConfig};

/// Rows of loamy topsoil under the surface
const TOPSOIL_DEPTH: usize = 3;

/// Noise value above which subsoil turns to clay (below the negation: sand)
const TEXTURE_THRESHOLD: f32 = 0.45;

/// Noise-driven world generator
pub struct WorldGenerator {
    pub seed: u64,
    config: GenerationConfig,
    surface_noise: FastNoiseLite,
    texture_noise: FastNoiseLite,
}

impl WorldGenerator {
    pub fn new(seed: u64, config: GenerationConfig) -> Self {
        let mut surface_noise = FastNoiseLite::with_seed(seed as i32);
        surface_noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        surface_noise.set_frequency(Some(config.noise_frequency));

        let mut texture_noise = FastNoiseLite::with_seed((seed as i32).wrapping_add(1));
        texture_noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        texture_noise.set_frequency(Some(config.noise_frequency * 3.0));

        Self {
            seed,
            config,
            surface_noise,
            texture_noise,
        }
    }

    /// Generate a populated world with every non-AIR cell active
    pub fn generate<R: WorldRng + ?Sized>(&self, sim: &SimConfig, rng: &mut R) -> WorldState {
        let mut grid = Grid::new(sim.grid.width, sim.grid.height);
        let ground_level = sim.grid.ground_level();

        self.lay_soil(&mut grid, ground_level);
        let ponds = self.dig_ponds(&mut grid, rng);
        let plants = self.plant(&mut grid, rng);
        let insects = self.scatter_insects(&mut grid, rng);
        let worms = self.scatter_worms(&mut grid, rng);
        let dead = self.scatter_dead_matter(&mut grid, rng);

        let mut world = WorldState::with_grid(grid, sim);
        world.activate_all_matter();

        log::info!(
            "Generated {}x{} world (seed={}): {} ponds, {} plants, {} insects, {} worms, {} dead matter, {} active cells",
            sim.grid.width,
            sim.grid.height,
            self.seed,
            ponds,
            plants,
            insects,
            worms,
            dead,
            world.active().len()
        );

        world
    }

    /// Surface row for a column
    fn surface_row(&self, x: usize, ground_level: usize, height: usize) -> usize {
        let offset = self.surface_noise.get_noise_2d(x as f32, 0.0) * self.config.surface_amplitude;
        let row = ground_level as i32 + offset.round() as i32;
        row.clamp(1, height as i32 - 1) as usize
    }

    fn lay_soil(&self, grid: &mut Grid, ground_level: usize) {
        let (width, height) = (grid.width(), grid.height());
        for x in 0..width {
            let surface = self.surface_row(x, ground_level, height);
            for y in surface..height {
                let index = y * width + x;
                let depth = y - surface;
                let water = (self.config.initial_moisture as usize + depth * 2).min(255) as u8;

                let state = if depth >= self.config.rocky_depth {
                    SoilState::Rocky
                } else if depth < TOPSOIL_DEPTH {
                    SoilState::Loamy
                } else {
                    let t = self.texture_noise.get_noise_2d(x as f32, y as f32);
                    if t > TEXTURE_THRESHOLD {
                        SoilState::Clay
                    } else if t < -TEXTURE_THRESHOLD {
                        SoilState::Sandy
                    } else {
                        SoilState::for_moisture(water)
                    }
                };

                grid.set_cell(index, CellType::Soil, state.as_u8());
                grid.water[index] = water;
                grid.nutrient[index] = if depth < TOPSOIL_DEPTH { 40 } else { 10 };
            }
        }
    }

    fn dig_ponds<R: WorldRng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let width = grid.width();
        let mut dug = 0;
        for _ in 0..self.config.pond_count {
            let pond_width = rng.gen_range_i32(6, 12) as usize;
            if pond_width >= width {
                continue;
            }
            let start = rng.gen_index(width - pond_width);
            for x in start..start + pond_width {
                let Some(surface) = surface_at(grid, x) else {
                    continue;
                };
                // Deeper in the middle
                let edge = (x - start).min(start + pond_width - 1 - x);
                let depth = (1 + edge).min(3);
                for y in surface..(surface + depth).min(grid.height()) {
                    let index = y * width + x;
                    grid.set_cell(index, CellType::Water, 0);
                    grid.water[index] = 100;
                    grid.nutrient[index] = 0;
                }
            }
            dug += 1;
        }
        dug
    }

    fn plant<R: WorldRng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let width = grid.width();
        let mut planted = 0;
        for _ in 0..self.config.plant_count {
            let x = rng.gen_index(width);
            let Some(surface) = surface_at(grid, x) else {
                continue;
            };
            if surface < 4 || surface + 2 >= grid.height() {
                continue;
            }
            if grid.cell_type[surface * width + x] != CellType::Soil {
                continue;
            }

            for y in [surface, surface + 1] {
                set_tissue(grid, y * width + x, PlantState::Root, 0);
            }
            set_tissue(grid, (surface - 1) * width + x, PlantState::Stem, 1);
            set_tissue(grid, (surface - 2) * width + x, PlantState::Stem, 2);
            set_tissue(grid, (surface - 3) * width + x, PlantState::Leaf, 0);
            for dx in [-1i32, 1] {
                if let Some(side) = grid.index(x as i32 + dx, surface as i32 - 2)
                    && grid.cell_type[side] == CellType::Air
                {
                    set_tissue(grid, side, PlantState::Leaf, 0);
                }
            }
            planted += 1;
        }
        planted
    }

    fn scatter_insects<R: WorldRng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let width = grid.width();
        let mut placed = 0;
        for _ in 0..self.config.insect_count {
            let x = rng.gen_index(width);
            let Some(surface) = surface_at(grid, x) else {
                continue;
            };
            let lift = 3 + rng.gen_index(5);
            if surface <= lift {
                continue;
            }
            let index = (surface - lift) * width + x;
            if grid.cell_type[index] == CellType::Air {
                grid.set_cell(index, CellType::Insect, 0);
                grid.energy[index] = 120;
                placed += 1;
            }
        }
        placed
    }

    fn scatter_worms<R: WorldRng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let width = grid.width();
        let mut placed = 0;
        for _ in 0..self.config.worm_count {
            let x = rng.gen_index(width);
            let Some(surface) = surface_at(grid, x) else {
                continue;
            };
            let y = surface + 2 + rng.gen_index(6);
            let Some(index) = grid.index(x as i32, y as i32) else {
                continue;
            };
            if grid.cell_type[index] == CellType::Soil {
                grid.set_cell(index, CellType::Worm, 0);
                grid.energy[index] = 120;
                placed += 1;
            }
        }
        placed
    }

    fn scatter_dead_matter<R: WorldRng + ?Sized>(&self, grid: &mut Grid, rng: &mut R) -> usize {
        let width = grid.width();
        let mut placed = 0;
        for _ in 0..self.config.dead_matter_count {
            let x = rng.gen_index(width);
            let Some(surface) = surface_at(grid, x) else {
                continue;
            };
            if surface == 0 || grid.cell_type[surface * width + x] != CellType::Soil {
                continue;
            }
            let index = (surface - 1) * width + x;
            if grid.cell_type[index] == CellType::Air {
                grid.set_cell(index, CellType::DeadMatter, 0);
                grid.nutrient[index] = 50;
                placed += 1;
            }
        }
        placed
    }
}

/// First non-AIR row of a column
pub fn surface_at(grid: &Grid, x: usize) -> Option<usize> {
    (0..grid.height()).find(|y| grid.cell_type[y * grid.width() + x] != CellType::Air)
}

fn set_tissue(grid: &mut Grid, index: usize, state: PlantState, height: u8) {
    grid.set_cell(index, CellType::Plant, state.as_u8());
    grid.metadata[index] = Metadata::Counter(height);
    grid.water[index] = 50;
    grid.nutrient[index] = 30;
    grid.energy[index] = 100;
}
