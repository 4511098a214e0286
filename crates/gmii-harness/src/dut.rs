//! Logic between the source and the sink.
//!
//! In a real testbench this is the design under test. The harness only needs
//! something that turns what the source drives into what the sink samples.

use std::collections::VecDeque;

use gmii_proto::GmiiSignals;

/// Signal path from source to sink.
pub trait Dut: Send {
    /// Values the sink samples this cycle, given what the source is driving.
    ///
    /// Called once per enabled cycle, in the sampling phase before the edge.
    fn propagate(&mut self, tx: GmiiSignals) -> GmiiSignals;

    /// True if no frame byte is held inside the DUT.
    fn is_quiet(&self) -> bool {
        true
    }
}

/// Wire straight through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loopback;

impl Dut for Loopback {
    fn propagate(&mut self, tx: GmiiSignals) -> GmiiSignals {
        tx
    }
}

/// Fixed-latency register pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    stages: VecDeque<GmiiSignals>,
}

impl Pipeline {
    /// Delay by `depth` cycles. A depth of zero behaves like [`Loopback`].
    pub fn new(depth: usize) -> Self {
        Self { stages: std::iter::repeat_n(GmiiSignals::IDLE, depth).collect() }
    }

    /// Number of register stages.
    pub fn depth(&self) -> usize {
        self.stages.len()
    }
}

impl Dut for Pipeline {
    fn propagate(&mut self, tx: GmiiSignals) -> GmiiSignals {
        self.stages.push_back(tx);
        self.stages.pop_front().unwrap_or(tx)
    }

    fn is_quiet(&self) -> bool {
        self.stages.iter().all(|s| !s.is_valid())
    }
}
