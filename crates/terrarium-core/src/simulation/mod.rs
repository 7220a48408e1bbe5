//! Rule engines and the scheduler that sequences them

pub mod biology;
mod driver;
pub mod environment;
pub mod physics;
mod scheduler;
pub mod stuck;

pub use biology::Biology;
pub use driver::Simulation;
pub use environment::Environment;
pub use physics::Physics;
pub use scheduler::{Scheduler, TickReport};
