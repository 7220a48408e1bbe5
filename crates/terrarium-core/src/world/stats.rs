//! Simulation statistics collection

use serde::Serialize;
use terrarium_simulation::{CELL_TYPE_COUNT, CellType};

use super::grid::Grid;

/// Trait for collecting simulation statistics
///
/// Rules report events through this so the kernel does not depend on any
/// particular collector.
pub trait SimStats {
    /// Record that a cell moved (swap or relocation)
    fn record_pixel_moved(&mut self);

    /// Record that a cell changed type in place (absorption, erosion, decay)
    fn record_conversion(&mut self);

    /// Record a new organism or seed
    fn record_birth(&mut self);

    /// Record an organism or seed dying
    fn record_death(&mut self);
}

/// A no-op implementation for when stats collection is not needed
#[derive(Default)]
pub struct NoopStats;

impl SimStats for NoopStats {
    fn record_pixel_moved(&mut self) {}
    fn record_conversion(&mut self) {}
    fn record_birth(&mut self) {}
    fn record_death(&mut self) {}
}

/// Running event counters
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CountingStats {
    pub pixels_moved: u64,
    pub conversions: u64,
    pub births: u64,
    pub deaths: u64,
}

impl SimStats for CountingStats {
    fn record_pixel_moved(&mut self) {
        self.pixels_moved += 1;
    }

    fn record_conversion(&mut self) {
        self.conversions += 1;
    }

    fn record_birth(&mut self) {
        self.births += 1;
    }

    fn record_death(&mut self) {
        self.deaths += 1;
    }
}

/// Number of cells of each type
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub counts: [usize; CELL_TYPE_COUNT],
}

impl Census {
    pub fn take(grid: &Grid) -> Self {
        let mut counts = [0; CELL_TYPE_COUNT];
        for cell_type in &grid.cell_type {
            counts[cell_type.as_u8() as usize] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, cell_type: CellType) -> usize {
        self.counts[cell_type.as_u8() as usize]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl std::fmt::Display for Census {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for cell_type in CellType::ALL {
            if cell_type == CellType::Air {
                continue;
            }
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{}={}", cell_type.name(), self.count(cell_type))?;
            first = false;
        }
        Ok(())
    }
}
