//! Terrarium - headless runner for the ecosystem simulation
//!
//! Loads a layered [`config::RunConfig`], drives a
//! [`terrarium_core::Simulation`] and produces a [`report::RunReport`].

pub mod config;
pub mod report;
pub mod runner;

pub use config::{RunConfig, RunSettings};
pub use report::RunReport;
pub use runner::run;
