//! Terrarium simulation kernel
//!
//! The grid data model, the active-pixel scheduler and the three rule engines
//! (environment, physics, biology) that advance the ecosystem one tick at a time.

pub mod config;
pub mod error;
pub mod simulation;
pub mod world;

pub use config::{ConfigError, SimConfig};
pub use error::SimError;
pub use simulation::{Scheduler, Simulation, TickReport};
pub use world::{Grid, WorldState};

// Re-export from terrarium-simulation so callers only need one dependency
pub use terrarium_simulation::{
    CellType, InsectState, Metadata, PlantSnapshot, PlantState, SoilState,
};
