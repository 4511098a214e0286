//! GMII link core logic
//!
//! Clocked state machines for both ends of a GMII link, decoupled from any
//! simulator. They never read a signal or wait for an edge themselves.
//!
//! # Architecture
//!
//! Each role is a pure state machine advanced once per clock cycle by an
//! external edge loop:
//!
//! 1. **Sample**: before the edge, the caller reads the control inputs and
//!    (for the sink) the bus. Nothing is mutated.
//! 2. **Edge**: the caller hands the samples to `on_edge`. The state machine
//!    updates itself and, for the source, returns the values to drive.
//!
//! Because both roles see only pre-edge samples, neither observes the
//! other's same-edge output, which is what makes a source and sink sharing
//! one clock race-free. The `gmii-harness` crate provides the edge loop.
//!
//! # Components
//!
//! - [`source`]: Frame transmitter (queue, inter-frame gap, reset flush)
//! - [`sink`]: Frame receiver (dv framing, error capture, rx timestamps)
//! - [`queue`]: FIFO with byte and frame occupancy counters
//! - [`bus`]: Signal layout validation and enable/valid alias resolution
//! - [`control`]: Per-cycle reset and clock-enable inputs

pub mod bus;
pub mod control;
pub mod queue;
pub mod sink;
pub mod source;

pub use bus::{BusLayout, FrameActive, ResolvedBus, SignalSpec};
pub use control::Control;
pub use queue::{FrameQueue, Occupancy};
pub use sink::{GmiiMonitor, GmiiSink, SinkEvent, SinkState};
pub use source::{GmiiSource, SourceAction, SourceConfig, SourceState, TxCursor};
