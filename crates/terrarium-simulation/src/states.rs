//! Type-relative cell states
//!
//! The `state` channel is a raw byte whose meaning depends on the cell type.
//! These enums give the byte a name for the two types that use it.

use serde::{Deserialize, Serialize};

/// Plant tissue kind
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlantState {
    #[default]
    Root = 0,
    Stem = 1,
    Leaf = 2,
    Flower = 3,
}

impl PlantState {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PlantState::Root),
            1 => Some(PlantState::Stem),
            2 => Some(PlantState::Leaf),
            3 => Some(PlantState::Flower),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Tissue that insects destroy outright when eating it
    pub fn is_soft_tissue(self) -> bool {
        !matches!(self, PlantState::Root)
    }
}

/// Soil moisture / texture class
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilState {
    Wet = 0,
    #[default]
    Dry = 1,
    Fertile = 2,
    Clay = 3,
    Sandy = 4,
    Loamy = 5,
    Rocky = 6,
}

impl SoilState {
    /// Water level at which WET/DRY soils flip
    pub const WET_THRESHOLD: u8 = 20;

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(SoilState::Wet),
            1 => Some(SoilState::Dry),
            2 => Some(SoilState::Fertile),
            3 => Some(SoilState::Clay),
            4 => Some(SoilState::Sandy),
            5 => Some(SoilState::Loamy),
            6 => Some(SoilState::Rocky),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Moisture transfer multiplier for this soil texture
    pub fn texture_multiplier(self) -> f32 {
        match self {
            SoilState::Clay => 0.4,
            SoilState::Sandy => 1.6,
            SoilState::Loamy => 1.0,
            SoilState::Rocky => 0.6,
            SoilState::Wet | SoilState::Dry | SoilState::Fertile => 1.0,
        }
    }

    /// Water holding capacity multiplier (clay holds more, sand drains)
    pub fn capacity_multiplier(self) -> f32 {
        match self {
            SoilState::Clay => 1.3,
            SoilState::Sandy => 0.6,
            SoilState::Rocky => 0.5,
            SoilState::Loamy | SoilState::Fertile => 1.1,
            SoilState::Wet | SoilState::Dry => 1.0,
        }
    }

    /// Whether moisture changes toggle this state between WET and DRY
    pub fn tracks_moisture(self) -> bool {
        matches!(self, SoilState::Wet | SoilState::Dry)
    }

    /// WET/DRY state for a given water level
    pub fn for_moisture(water: u8) -> Self {
        if water >= Self::WET_THRESHOLD {
            SoilState::Wet
        } else {
            SoilState::Dry
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plant_state_decoding() {
        assert_eq!(PlantState::from_u8(0), Some(PlantState::Root));
        assert_eq!(PlantState::from_u8(3), Some(PlantState::Flower));
        assert_eq!(PlantState::from_u8(4), None);
    }

    #[test]
    fn test_soft_tissue() {
        assert!(!PlantState::Root.is_soft_tissue());
        assert!(PlantState::Leaf.is_soft_tissue());
        assert!(PlantState::Stem.is_soft_tissue());
        assert!(PlantState::Flower.is_soft_tissue());
    }

    #[test]
    fn test_moisture_threshold() {
        assert_eq!(SoilState::for_moisture(19), SoilState::Dry);
        assert_eq!(SoilState::for_moisture(20), SoilState::Wet);
        assert_eq!(SoilState::for_moisture(255), SoilState::Wet);
    }

    #[test]
    fn test_texture_multipliers() {
        assert!(SoilState::Sandy.texture_multiplier() > SoilState::Loamy.texture_multiplier());
        assert!(SoilState::Clay.texture_multiplier() < SoilState::Rocky.texture_multiplier());
        assert_eq!(SoilState::Wet.texture_multiplier(), 1.0);
    }

    #[test]
    fn test_only_wet_and_dry_track_moisture() {
        assert!(SoilState::Wet.tracks_moisture());
        assert!(SoilState::Dry.tracks_moisture());
        assert!(!SoilState::Fertile.tracks_moisture());
        assert!(!SoilState::Clay.tracks_moisture());
    }
}
