//! Deterministic simulation harness for GMII link testing.
//!
//! Stands in for the host simulator: it owns the wires, the clock, reset and
//! clock enable, and advances a source and sink together with the
//! sample-then-drive ordering a real clocked design sees.
//!
//! Two ways to drive it:
//!
//! - [`World`]: synchronous, one [`World::step`] per clock cycle. Used by the
//!   scenario runner and property tests.
//! - [`Testbench`]: a tokio clock task stepping a shared `World`, with
//!   cooperative `wait()` calls for producers and consumers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dut;
pub mod error;
pub mod model;
pub mod payloads;
pub mod scenario;
pub mod stimulus;
pub mod testbench;
pub mod world;

pub use dut::{Dut, Loopback, Pipeline};
pub use error::HarnessError;
pub use stimulus::ClockEnable;
pub use testbench::{SinkHandle, SourceHandle, Testbench, WaitOutcome};
pub use world::{SimConfig, StepReport, World};
