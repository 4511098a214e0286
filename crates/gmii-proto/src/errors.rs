//! Construction-time errors.
//!
//! The link itself has no recoverable runtime errors. Everything that can go
//! wrong is a wiring mistake, and those are caught before the first clock
//! edge.

use thiserror::Error;

/// Result alias for bus construction.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Bus wiring errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A signal is wired with the wrong number of bits.
    #[error("signal {signal} is {actual} bits wide, expected {expected}")]
    WidthMismatch {
        /// Signal name (`d`, `er`, `en`, `dv`)
        signal: &'static str,
        /// Required width in bits
        expected: u32,
        /// Width found on the bus
        actual: u32,
    },

    /// A signal the role cannot operate without is not wired.
    #[error("required signal {0} is not wired")]
    MissingSignal(&'static str),
}
