//! Per-cell metadata
//!
//! Most cell types keep a single counter (stuck counter, decomposition progress,
//! stem height, seeds produced). Insects keep a small record instead.

use serde::{Deserialize, Serialize};

use crate::{CellType, PlantState};

/// Plant pixel an insect is currently sitting on, restored when it leaves or dies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub state: PlantState,
    pub water: u8,
    pub nutrient: u8,
    pub energy: u8,
    pub counter: u8,
}

/// Insect bookkeeping
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsectState {
    /// Consecutive hungry ticks
    pub starvation: u8,
    /// Insect currently occupies a plant pixel
    pub on_plant: bool,
    pub saved_plant: Option<PlantSnapshot>,
}

impl InsectState {
    /// Take the stored plant, clearing the on-plant flag
    pub fn take_plant(&mut self) -> Option<PlantSnapshot> {
        self.on_plant = false;
        self.saved_plant.take()
    }
}

/// Metadata channel value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metadata {
    Counter(u8),
    Insect(InsectState),
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata::Counter(0)
    }
}

impl Metadata {
    /// Fresh metadata for a cell that just became `cell_type`
    pub fn fresh_for(cell_type: CellType) -> Self {
        match cell_type {
            CellType::Insect => Metadata::Insect(InsectState::default()),
            _ => Metadata::Counter(0),
        }
    }

    /// Counter value (0 for insect records)
    pub fn counter(&self) -> u8 {
        match self {
            Metadata::Counter(value) => *value,
            Metadata::Insect(_) => 0,
        }
    }

    /// Saturating increment; returns the new value
    pub fn bump(&mut self, amount: u8) -> u8 {
        let next = self.counter().saturating_add(amount);
        *self = Metadata::Counter(next);
        next
    }

    pub fn reset(&mut self) {
        *self = Metadata::Counter(0);
    }

    pub fn insect(&self) -> Option<&InsectState> {
        match self {
            Metadata::Insect(state) => Some(state),
            Metadata::Counter(_) => None,
        }
    }

    pub fn insect_mut(&mut self) -> Option<&mut InsectState> {
        match self {
            Metadata::Insect(state) => Some(state),
            Metadata::Counter(_) => None,
        }
    }

    /// Ensure this value holds an insect record
    ///
    /// Returns true if the stored value had to be replaced.
    pub fn repair_insect(&mut self) -> bool {
        match self {
            Metadata::Insect(_) => false,
            Metadata::Counter(_) => {
                *self = Metadata::Insect(InsectState::default());
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_metadata() {
        assert_eq!(Metadata::fresh_for(CellType::Water), Metadata::Counter(0));
        assert!(Metadata::fresh_for(CellType::Insect).insect().is_some());
    }

    #[test]
    fn test_bump_saturates() {
        let mut meta = Metadata::Counter(250);
        assert_eq!(meta.bump(3), 253);
        assert_eq!(meta.bump(10), 255);
        assert_eq!(meta.counter(), 255);
    }

    #[test]
    fn test_bump_replaces_insect_record() {
        let mut meta = Metadata::Insect(InsectState::default());
        assert_eq!(meta.bump(1), 1);
        assert_eq!(meta, Metadata::Counter(1));
    }

    #[test]
    fn test_repair_insect() {
        let mut meta = Metadata::Counter(42);
        assert!(meta.repair_insect());
        assert_eq!(meta.insect(), Some(&InsectState::default()));
        assert!(!meta.repair_insect());
    }

    #[test]
    fn test_take_plant_clears_flag() {
        let snapshot = PlantSnapshot {
            state: PlantState::Leaf,
            water: 10,
            nutrient: 5,
            energy: 80,
            counter: 0,
        };
        let mut insect = InsectState {
            starvation: 0,
            on_plant: true,
            saved_plant: Some(snapshot),
        };
        assert_eq!(insect.take_plant(), Some(snapshot));
        assert!(!insect.on_plant);
        assert_eq!(insect.take_plant(), None);
    }
}
