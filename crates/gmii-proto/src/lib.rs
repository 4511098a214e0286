//! Data types for the GMII byte-wide link model.
//!
//! A GMII link moves one byte per clock cycle across a hardware boundary.
//! Frames are delimited by the data-valid line (`dv`): a frame starts on the
//! first cycle `dv` is high and ends on the first cycle it drops again. Each
//! byte may carry an error marker on `er`.
//!
//! This crate holds the pieces that both ends of the link agree on: the frame
//! type, the per-cycle signal values, simulation time, and the configuration
//! errors raised when a bus is wired incorrectly. The clocked state machines
//! that move frames live in `gmii-core`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod errors;
pub mod frame;
pub mod signals;
pub mod time;

pub use constants::{BYTE_WIDTH, DATA_WIDTH, ETH_PREAMBLE, EthPre};
pub use errors::{ConfigError, Result};
pub use frame::GmiiFrame;
pub use signals::GmiiSignals;
pub use time::SimTime;
