//! Cell type definitions

use serde::{Deserialize, Serialize};

/// Number of distinct cell types
pub const CELL_TYPE_COUNT: usize = 8;

/// Material category of a grid cell
///
/// Stored as one byte per cell; renderers read the raw discriminant.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    Air = 0,
    Water = 1,
    Soil = 2,
    Plant = 3,
    Insect = 4,
    Seed = 5,
    DeadMatter = 6,
    Worm = 7,
}

impl CellType {
    /// All cell types in discriminant order
    pub const ALL: [CellType; CELL_TYPE_COUNT] = [
        CellType::Air,
        CellType::Water,
        CellType::Soil,
        CellType::Plant,
        CellType::Insect,
        CellType::Seed,
        CellType::DeadMatter,
        CellType::Worm,
    ];

    /// Decode a raw byte, `None` for unknown values
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Rank used when the active set has to be pruned (0 = most important)
    ///
    /// PLANT > WATER > SOIL > SEED > INSECT > WORM > DEAD_MATTER > AIR
    pub fn prune_rank(self) -> u8 {
        match self {
            CellType::Plant => 0,
            CellType::Water => 1,
            CellType::Soil => 2,
            CellType::Seed => 3,
            CellType::Insect => 4,
            CellType::Worm => 5,
            CellType::DeadMatter => 6,
            CellType::Air => 7,
        }
    }

    /// Types that fall under gravity (soil only when soil gravity is enabled)
    pub fn is_falling(self) -> bool {
        matches!(
            self,
            CellType::Seed | CellType::DeadMatter | CellType::Worm | CellType::Insect
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            CellType::Air => "air",
            CellType::Water => "water",
            CellType::Soil => "soil",
            CellType::Plant => "plant",
            CellType::Insect => "insect",
            CellType::Seed => "seed",
            CellType::DeadMatter => "dead_matter",
            CellType::Worm => "worm",
        }
    }
}
