//! Environmental forcing read by the physics and biology rules

use glam::IVec2;

/// Side length of a temperature cell in grid cells
pub const TEMPERATURE_CELL_SIZE: usize = 8;

/// Horizontal wind
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    /// -1 (blowing left) to 1 (blowing right)
    pub direction: f32,
    /// 0 (calm) to 1 (gale)
    pub strength: f32,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            direction: 0.5,
            strength: 0.3,
        }
    }
}

impl Wind {
    /// Whole-cell displacement the wind pushes air toward
    pub fn displacement(&self) -> IVec2 {
        IVec2::new(self.direction.round() as i32, 0)
    }

    /// Column step used by cloud drift (never zero)
    pub fn drift_step(&self) -> i32 {
        if self.direction < 0.0 { -1 } else { 1 }
    }
}

/// Coarse temperature grid in degrees Celsius
#[derive(Clone, Debug)]
pub struct TemperatureField {
    cols: usize,
    rows: usize,
    values: Vec<f32>,
}

impl TemperatureField {
    pub fn new(grid_width: usize, grid_height: usize, initial: f32) -> Self {
        let cols = grid_width.div_ceil(TEMPERATURE_CELL_SIZE).max(1);
        let rows = grid_height.div_ceil(TEMPERATURE_CELL_SIZE).max(1);
        Self {
            cols,
            rows,
            values: vec![initial; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Temperature at grid coordinates
    pub fn at(&self, x: usize, y: usize) -> f32 {
        let cx = (x / TEMPERATURE_CELL_SIZE).min(self.cols - 1);
        let cy = (y / TEMPERATURE_CELL_SIZE).min(self.rows - 1);
        self.values[cy * self.cols + cx]
    }

    /// Temperature of a coarse cell
    pub fn cell(&self, cx: usize, cy: usize) -> f32 {
        self.values[cy.min(self.rows - 1) * self.cols + cx.min(self.cols - 1)]
    }

    pub fn set_cell(&mut self, cx: usize, cy: usize, value: f32) {
        if cx < self.cols && cy < self.rows {
            self.values[cy * self.cols + cx] = value;
        }
    }

    pub fn mean(&self) -> f32 {
        self.values.iter().sum::<f32>() / self.values.len() as f32
    }
}

/// Evaporation multiplier for a temperature
pub fn evaporation_factor(temperature: f32) -> f32 {
    ((temperature - 5.0) / 20.0).clamp(0.25, 3.0)
}

/// Everything the environment driver publishes for the other rule engines
#[derive(Clone, Debug)]
pub struct Forcing {
    /// Ticks advanced since the world was created
    pub tick: u64,
    /// Day phase in [0, 1), 0 = midnight
    pub phase: f32,
    /// Sunlight in [0, 1]
    pub daylight: f32,
    pub wind: Wind,
    pub raining: bool,
    pub temperature: TemperatureField,
}

impl Forcing {
    pub fn new(grid_width: usize, grid_height: usize, phase: f32, temperature: f32) -> Self {
        Self {
            tick: 0,
            phase,
            daylight: daylight_for_phase(phase),
            wind: Wind::default(),
            raining: false,
            temperature: TemperatureField::new(grid_width, grid_height, temperature),
        }
    }

    /// Temperature at a flat index
    pub fn temperature_at(&self, grid_width: usize, index: usize) -> f32 {
        self.temperature
            .at(index % grid_width.max(1), index / grid_width.max(1))
    }
}

/// Daylight for a day phase: 0 at midnight, 1 at noon
pub fn daylight_for_phase(phase: f32) -> f32 {
    let angle = phase * std::f32::consts::TAU;
    (1.0 - angle.cos()) / 2.0
}
