//! Cell definitions for Terrarium
//!
//! This crate provides the foundational data types shared by the simulation kernel
//! and anything that reads its buffers (renderers, tools):
//! - Cell types and their pruning priority (CellType)
//! - Type-relative sub-states (PlantState, SoilState)
//! - The per-cell metadata union (Metadata, InsectState, PlantSnapshot)

mod cells;
mod metadata;
mod states;

pub use cells::{CELL_TYPE_COUNT, CellType};
pub use metadata::{InsectState, Metadata, PlantSnapshot};
pub use states::{PlantState, SoilState};
