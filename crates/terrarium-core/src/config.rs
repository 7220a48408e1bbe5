//! Simulation configuration
//!
//! Every section is `#[serde(default)]`, so a RON file only needs the values it
//! overrides. Probabilities are per-cell, per-tick chances in `[0, 1]`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while parsing or validating a [`SimConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid dimensions must be non-zero (got {width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    #[error("ground level ratio must be within (0, 1) (got {0})")]
    GroundLevel(f32),

    #[error("{name} must be within [0, 1] (got {value})")]
    Probability { name: &'static str, value: f32 },

    #[error("{0} must be non-zero")]
    Zero(&'static str),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub grid: GridConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub physics: PhysicsConfig,

    #[serde(default)]
    pub biology: BiologyConfig,

    #[serde(default)]
    pub environment: EnvironmentConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Grid shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    /// Side length of a chunk tile in cells
    pub chunk_size: usize,
    /// Ground level as a fraction of the height, measured from the top
    pub ground_level_ratio: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            chunk_size: 16,
            ground_level_ratio: 0.6,
        }
    }
}

impl GridConfig {
    /// Row index of the nominal ground surface
    pub fn ground_level(&self) -> usize {
        ground_level_row(self.height, self.ground_level_ratio)
    }
}

/// Ground row for a grid of `height` rows, clamped to the last row
pub fn ground_level_row(height: usize, ratio: f32) -> usize {
    ((height as f32 * ratio) as usize).min(height.saturating_sub(1))
}

/// Active-set bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Ceiling on the number of cells evaluated per tick
    pub max_active_pixels: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_active_pixels: 100_000,
        }
    }
}

/// Physics rule parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // Seed dispersal
    pub seed_dispersal_chance: f32,
    pub seed_dispersal_radius: i32,
    pub seed_cluster_chance: f32,
    /// Energy a flower spends per dispersed seed
    pub dispersal_energy_cost: u8,
    pub dispersed_seed_energy: u8,
    pub seed_slide_chance: f32,

    // Fluid dynamics
    /// Water population above which ground-level water is drained
    pub water_emergency_threshold: usize,
    pub emergency_drain_fraction: f32,
    pub evaporation_chance: f32,
    /// Stuck ticks before water resting on soil soaks into it
    pub absorb_stuck_threshold: u8,
    /// Soil within this many rows of ground level drains without limit
    pub surface_drainage_depth: usize,
    pub min_soil_capacity: u8,
    pub soil_absorb_rate: f32,
    /// Fraction lost on every resource transfer
    pub transfer_loss: f32,
    pub spread_chance: f32,
    pub ground_spread_chance: f32,
    pub loosen_threshold: u8,
    pub force_threshold: u8,
    pub convert_threshold: u8,
    pub convert_chance: f32,

    // Soil moisture
    pub moisture_threshold: u8,
    pub diffusion_rate: f32,
    pub lateral_diffusion_chance: f32,
    pub soil_evaporation_chance: f32,

    // Gravity
    pub soil_gravity: bool,
    pub diagonal_base: f32,
    pub diagonal_step: f32,
    pub gravity_force_threshold: u8,
    pub seed_burrow_chance: f32,
    pub insect_flight_chance: f32,
    /// Ticks between sweeps of touched chunks for unsupported cells
    pub gravity_sweep_interval: u64,

    // Erosion
    pub erosion_sample_chance: f32,
    pub erosion_strength: f32,

    // Air
    pub air_move_chance: f32,
    pub midair_water_push_chance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            seed_dispersal_chance: 0.15,
            seed_dispersal_radius: 15,
            seed_cluster_chance: 0.3,
            dispersal_energy_cost: 5,
            dispersed_seed_energy: 30,
            seed_slide_chance: 0.25,
            water_emergency_threshold: 20_000,
            emergency_drain_fraction: 0.1,
            evaporation_chance: 0.0005,
            absorb_stuck_threshold: 3,
            surface_drainage_depth: 5,
            min_soil_capacity: 40,
            soil_absorb_rate: 0.5,
            transfer_loss: 0.05,
            spread_chance: 0.6,
            ground_spread_chance: 0.9,
            loosen_threshold: 4,
            force_threshold: 8,
            convert_threshold: 60,
            convert_chance: 0.02,
            moisture_threshold: 30,
            diffusion_rate: 0.25,
            lateral_diffusion_chance: 0.3,
            soil_evaporation_chance: 0.01,
            soil_gravity: false,
            diagonal_base: 0.2,
            diagonal_step: 0.15,
            gravity_force_threshold: 6,
            seed_burrow_chance: 0.02,
            insect_flight_chance: 0.6,
            gravity_sweep_interval: 30,
            erosion_sample_chance: 0.05,
            erosion_strength: 0.3,
            air_move_chance: 0.3,
            midair_water_push_chance: 0.7,
        }
    }
}

/// Biology rule parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiologyConfig {
    pub transfer_loss: f32,
    /// Temperature at or above which organisms take damage
    pub heat_stress: f32,
    /// Temperature at or below which organisms take damage
    pub cold_stress: f32,

    // Plants
    pub metabolism_chance: f32,
    pub water_use_chance: f32,
    /// Roots convert nutrient into energy below this level
    pub root_energy_cap: u8,
    pub root_uptake: u8,
    pub root_growth_chance: f32,
    pub root_growth_energy: u8,
    pub root_mass_for_stem: usize,
    pub stem_sprout_chance: f32,
    pub stem_sprout_energy: u8,
    pub stem_growth_chance: f32,
    pub stem_growth_energy: u8,
    pub max_stem_height: u8,
    pub leaf_sprout_chance: f32,
    pub leaf_sprout_energy: u8,
    pub flower_min_height: u8,
    pub flower_min_energy: u8,
    pub flower_chance: f32,
    pub photosynthesis_rate: f32,
    pub leaf_energy_cap: u8,
    pub leaf_share_threshold: u8,
    pub flower_seed_chance: f32,
    pub seed_energy_cost: u8,
    pub max_seeds_per_flower: u8,
    pub seed_initial_energy: u8,

    // Seeds
    pub germination_water: u8,
    pub germination_chance: f32,
    pub seed_decay_chance: f32,

    // Insects
    pub insect_metabolism_chance: f32,
    pub hunger_threshold: u8,
    /// Insects below this energy eat before moving
    pub eat_threshold: u8,
    pub starvation_limit: u8,
    pub root_bite: u8,
    pub insect_reproduce_energy: u8,
    pub insect_reproduce_chance: f32,
    pub insect_move_chance: f32,
    pub insect_sense_radius: i32,
    /// Chance an insect settles onto soft plant tissue instead of open air
    pub insect_land_chance: f32,

    // Worms
    pub worm_metabolism_chance: f32,
    pub worm_meal_energy: u8,
    /// Nutrient left in the fertile soil where a worm ate dead matter
    pub worm_meal_nutrient: u8,
    pub worm_move_chance: f32,

    // Decomposition
    pub decomposition_nutrient: u8,
    pub warm_decomposition_temperature: f32,
}

impl Default for BiologyConfig {
    fn default() -> Self {
        Self {
            transfer_loss: 0.1,
            heat_stress: 38.0,
            cold_stress: -2.0,
            metabolism_chance: 0.2,
            water_use_chance: 0.1,
            root_energy_cap: 120,
            root_uptake: 4,
            root_growth_chance: 0.04,
            root_growth_energy: 30,
            root_mass_for_stem: 4,
            stem_sprout_chance: 0.05,
            stem_sprout_energy: 40,
            stem_growth_chance: 0.05,
            stem_growth_energy: 40,
            max_stem_height: 40,
            leaf_sprout_chance: 0.08,
            leaf_sprout_energy: 30,
            flower_min_height: 8,
            flower_min_energy: 150,
            flower_chance: 0.02,
            photosynthesis_rate: 4.0,
            leaf_energy_cap: 200,
            leaf_share_threshold: 100,
            flower_seed_chance: 0.05,
            seed_energy_cost: 60,
            max_seeds_per_flower: 3,
            seed_initial_energy: 40,
            germination_water: 30,
            germination_chance: 0.05,
            seed_decay_chance: 0.01,
            insect_metabolism_chance: 0.3,
            hunger_threshold: 40,
            eat_threshold: 150,
            starvation_limit: 100,
            root_bite: 20,
            insect_reproduce_energy: 180,
            insect_reproduce_chance: 0.02,
            insect_move_chance: 0.6,
            insect_sense_radius: 5,
            insect_land_chance: 0.3,
            worm_metabolism_chance: 0.1,
            worm_meal_energy: 30,
            worm_meal_nutrient: 60,
            worm_move_chance: 0.3,
            decomposition_nutrient: 40,
            warm_decomposition_temperature: 25.0,
        }
    }
}

/// Environment forcing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Ticks per full day/night cycle
    pub day_length: u32,
    /// Day phase at startup (0 = midnight, 0.5 = noon)
    pub start_phase: f32,
    /// Global temperature offset in degrees
    pub temperature_offset: f32,
    pub base_temperature: f32,
    /// Extra warmth at full daylight
    pub day_swing: f32,
    pub underground_temperature: f32,
    /// Cooling under a fully dense cloud
    pub cloud_shading: f32,
    /// Fraction of the height (from the top) where clouds live
    pub cloud_band_ratio: f32,
    pub cloud_spawn_chance: f32,
    pub cloud_decay_chance: f32,
    pub cloud_drift_interval: u64,
    pub rain_start_chance: f32,
    pub rain_stop_chance: f32,
    /// Chance a sampled dense cloud cell drops water while raining
    pub rain_chance: f32,
    pub rain_cloud_density: u8,
    pub raindrop_water: u8,
    /// Per-tick random walk step of wind direction and strength
    pub wind_variability: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            day_length: 2400,
            start_phase: 0.5,
            temperature_offset: 0.0,
            base_temperature: 12.0,
            day_swing: 14.0,
            underground_temperature: 12.0,
            cloud_shading: 4.0,
            cloud_band_ratio: 0.15,
            cloud_spawn_chance: 0.01,
            cloud_decay_chance: 0.01,
            cloud_drift_interval: 4,
            rain_start_chance: 0.002,
            rain_stop_chance: 0.01,
            rain_chance: 0.05,
            rain_cloud_density: 80,
            raindrop_water: 60,
            wind_variability: 0.05,
        }
    }
}

/// Initial world generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Maximum deviation of the soil surface from ground level, in rows
    pub surface_amplitude: f32,
    pub noise_frequency: f32,
    /// Depth below the surface where soil turns rocky
    pub rocky_depth: usize,
    pub initial_moisture: u8,
    pub pond_count: usize,
    pub plant_count: usize,
    pub insect_count: usize,
    pub worm_count: usize,
    pub dead_matter_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            surface_amplitude: 6.0,
            noise_frequency: 0.03,
            rocky_depth: 25,
            initial_moisture: 25,
            pond_count: 2,
            plant_count: 6,
            insect_count: 4,
            worm_count: 8,
            dead_matter_count: 10,
        }
    }
}

fn check_probability(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { name, value })
    }
}

impl SimConfig {
    /// Parse a RON document and validate it
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let grid = &self.grid;
        if grid.width == 0 || grid.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: grid.width,
                height: grid.height,
            });
        }
        if grid.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if !(grid.ground_level_ratio > 0.0 && grid.ground_level_ratio < 1.0) {
            return Err(ConfigError::GroundLevel(grid.ground_level_ratio));
        }
        if self.scheduler.max_active_pixels == 0 {
            return Err(ConfigError::Zero("max_active_pixels"));
        }
        if self.environment.day_length == 0 {
            return Err(ConfigError::Zero("day_length"));
        }
        if self.physics.gravity_sweep_interval == 0 {
            return Err(ConfigError::Zero("gravity_sweep_interval"));
        }
        if self.environment.cloud_drift_interval == 0 {
            return Err(ConfigError::Zero("cloud_drift_interval"));
        }

        let p = &self.physics;
        for (name, value) in [
            ("seed_dispersal_chance", p.seed_dispersal_chance),
            ("seed_cluster_chance", p.seed_cluster_chance),
            ("seed_slide_chance", p.seed_slide_chance),
            ("emergency_drain_fraction", p.emergency_drain_fraction),
            ("evaporation_chance", p.evaporation_chance),
            ("soil_absorb_rate", p.soil_absorb_rate),
            ("physics.transfer_loss", p.transfer_loss),
            ("spread_chance", p.spread_chance),
            ("ground_spread_chance", p.ground_spread_chance),
            ("convert_chance", p.convert_chance),
            ("diffusion_rate", p.diffusion_rate),
            ("lateral_diffusion_chance", p.lateral_diffusion_chance),
            ("soil_evaporation_chance", p.soil_evaporation_chance),
            ("seed_burrow_chance", p.seed_burrow_chance),
            ("insect_flight_chance", p.insect_flight_chance),
            ("erosion_sample_chance", p.erosion_sample_chance),
            ("erosion_strength", p.erosion_strength),
            ("air_move_chance", p.air_move_chance),
            ("midair_water_push_chance", p.midair_water_push_chance),
        ] {
            check_probability(name, value)?;
        }

        let b = &self.biology;
        for (name, value) in [
            ("biology.transfer_loss", b.transfer_loss),
            ("metabolism_chance", b.metabolism_chance),
            ("water_use_chance", b.water_use_chance),
            ("root_growth_chance", b.root_growth_chance),
            ("stem_sprout_chance", b.stem_sprout_chance),
            ("stem_growth_chance", b.stem_growth_chance),
            ("leaf_sprout_chance", b.leaf_sprout_chance),
            ("flower_chance", b.flower_chance),
            ("flower_seed_chance", b.flower_seed_chance),
            ("germination_chance", b.germination_chance),
            ("seed_decay_chance", b.seed_decay_chance),
            ("insect_metabolism_chance", b.insect_metabolism_chance),
            ("insect_reproduce_chance", b.insect_reproduce_chance),
            ("insect_move_chance", b.insect_move_chance),
            ("insect_land_chance", b.insect_land_chance),
            ("worm_metabolism_chance", b.worm_metabolism_chance),
            ("worm_move_chance", b.worm_move_chance),
        ] {
            check_probability(name, value)?;
        }

        let e = &self.environment;
        for (name, value) in [
            ("start_phase", e.start_phase),
            ("cloud_band_ratio", e.cloud_band_ratio),
            ("cloud_spawn_chance", e.cloud_spawn_chance),
            ("cloud_decay_chance", e.cloud_decay_chance),
            ("rain_start_chance", e.rain_start_chance),
            ("rain_stop_chance", e.rain_stop_chance),
            ("rain_chance", e.rain_chance),
            ("wind_variability", e.wind_variability),
        ] {
            check_probability(name, value)?;
        }

        Ok(())
    }

    /// Configuration with every random process that adds or removes matter turned
    /// off: no weather, no evaporation, no spontaneous conversion
    pub fn quiet() -> Self {
        let mut config = Self::default();
        config.environment.cloud_spawn_chance = 0.0;
        config.environment.rain_start_chance = 0.0;
        config.physics.evaporation_chance = 0.0;
        config.physics.soil_evaporation_chance = 0.0;
        config.physics.convert_chance = 0.0;
        config
    }
}
