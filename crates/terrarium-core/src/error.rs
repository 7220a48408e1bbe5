//! Kernel error types

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a tick or prevent a simulation from starting
#[derive(Debug, Error)]
pub enum SimError {
    /// A channel buffer was resized from outside the kernel
    #[error("channel `{channel}` has {actual} entries, expected {expected}")]
    ChannelLength {
        channel: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A previous tick failed; the driver refuses to continue until resumed
    #[error("simulation is paused after an aborted tick")]
    Paused,
}
