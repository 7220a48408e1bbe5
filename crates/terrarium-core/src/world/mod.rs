//! World data model - grid channels, chunks, active sets, forcing

mod active;
mod chunk;
pub mod forcing;
pub mod generation;
mod grid;
pub mod rng_trait;
mod state;
pub mod stats;

pub use active::{ActivePixels, PixelSet};
pub use chunk::{Chunk, ChunkIndex};
pub use forcing::{Forcing, TemperatureField, Wind, evaporation_factor};
pub use generation::WorldGenerator;
pub use grid::{Grid, Neighbor, Resource};
pub use rng_trait::WorldRng;
pub use state::WorldState;
pub use stats::{Census, CountingStats, NoopStats, SimStats};
