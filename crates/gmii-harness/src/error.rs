//! Harness errors.

use gmii_proto::ConfigError;
use thiserror::Error;

/// Errors raised while building or running a simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// Source or sink could not be built
    #[error("bus configuration: {0}")]
    Config(#[from] ConfigError),

    /// The link did not settle in time
    #[error("link not quiescent after {cycles} cycles")]
    Timeout {
        /// Cycles simulated before giving up
        cycles: u64,
    },

    /// The clock task is no longer running
    #[error("clock stopped")]
    ClockStopped,
}
