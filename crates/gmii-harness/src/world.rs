//! Cycle-accurate simulation world.
//!
//! The World owns one source, one sink and the wires between them, and
//! advances all of them on a shared clock.
//!
//! # Cycle
//!
//! Each [`World::step`] is one rising edge:
//!
//! 1. **Sample** (read-only): the sink's view of the bus is computed by
//!    passing the currently driven wires through the DUT, and the reset and
//!    clock-enable lines are read. The current time is the sample time and
//!    becomes the receive time of a frame that starts here.
//! 2. **Edge**: simulation time advances one period, the source computes its
//!    next output and drives it, and the sink consumes the pre-edge sample.
//!
//! A byte the source drives at edge N is therefore sampled by the sink at
//! edge N + 1, exactly as with registered outputs in hardware.
//!
//! The DUT shares the clock enable: while it is low the DUT is not clocked
//! and both ends hold.

use gmii_core::{
    BusLayout, Control, GmiiSink, GmiiSource, SinkEvent, SourceConfig, SourceState,
};
use gmii_proto::{GmiiSignals, SimTime};
use tracing::trace;

use crate::{
    dut::{Dut, Loopback},
    error::HarnessError,
};

/// Simulation parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    /// Clock period in picoseconds
    pub clock_period_ps: u64,
}

impl Default for SimConfig {
    /// 125 MHz, the GMII clock at 1 Gb/s.
    fn default() -> Self {
        Self { clock_period_ps: 8_000 }
    }
}

/// Result of one clock edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Edge number, starting at 1
    pub cycle: u64,
    /// Values on the source side after the edge
    pub driven: GmiiSignals,
    /// Frame completed at the sink on this edge
    pub event: Option<SinkEvent>,
}

/// Source, sink, wires and clock.
pub struct World {
    source: GmiiSource,
    sink: GmiiSink,
    dut: Box<dyn Dut>,
    wires: GmiiSignals,
    reset: bool,
    enable: Option<bool>,
    cycle: u64,
    now: SimTime,
    config: SimConfig,
    trace: Option<Vec<GmiiSignals>>,
}

impl World {
    /// Wire `source` to `sink` through a [`Loopback`].
    pub fn new(source: GmiiSource, sink: GmiiSink) -> Self {
        Self {
            source,
            sink,
            dut: Box::new(Loopback),
            wires: GmiiSignals::IDLE,
            reset: false,
            enable: None,
            cycle: 0,
            now: SimTime::ZERO,
            config: SimConfig::default(),
            trace: None,
        }
    }

    /// Standard GMII wiring on both ends with the given source settings.
    ///
    /// # Errors
    ///
    /// Never fails for the standard layout; the `Result` carries layout
    /// validation through for callers building on this.
    pub fn loopback(config: SourceConfig) -> Result<Self, HarnessError> {
        let layout = BusLayout::gmii();
        Ok(Self::new(GmiiSource::new(&layout, config)?, GmiiSink::new(&layout)?))
    }

    /// Replace the DUT.
    #[must_use]
    pub fn with_dut(mut self, dut: impl Dut + 'static) -> Self {
        self.dut = Box::new(dut);
        self
    }

    /// Replace the simulation parameters.
    #[must_use]
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    /// Simulation parameters.
    pub fn config(&self) -> SimConfig {
        self.config
    }

    /// Start recording the driven wires on every edge.
    pub fn enable_trace(&mut self) {
        self.trace.get_or_insert_with(Vec::new);
    }

    /// Recorded wires, one entry per edge since tracing was enabled.
    pub fn trace(&self) -> &[GmiiSignals] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// The source.
    pub fn source(&self) -> &GmiiSource {
        &self.source
    }

    /// The source, mutably (to queue frames or change the gap).
    pub fn source_mut(&mut self) -> &mut GmiiSource {
        &mut self.source
    }

    /// The sink.
    pub fn sink(&self) -> &GmiiSink {
        &self.sink
    }

    /// The sink, mutably (to collect frames).
    pub fn sink_mut(&mut self) -> &mut GmiiSink {
        &mut self.sink
    }

    /// Drive the reset line.
    pub fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;
    }

    /// Drive the clock-enable line. `None` leaves it unwired (always enabled).
    pub fn set_enable(&mut self, enable: Option<bool>) {
        self.enable = enable;
    }

    /// Edges simulated so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Values the source is currently driving.
    pub fn wires(&self) -> GmiiSignals {
        self.wires
    }

    /// True when nothing is queued, in flight, or on the wire.
    pub fn is_quiescent(&self) -> bool {
        self.source.is_idle()
            && self.sink.is_idle()
            && !self.wires.is_valid()
            && self.dut.is_quiet()
    }

    /// Simulate one clock edge.
    pub fn step(&mut self) -> StepReport {
        let control = Control { reset: self.reset, enable: self.enable.unwrap_or(true) };
        let sample =
            if control.enable { self.dut.propagate(self.wires) } else { GmiiSignals::IDLE };
        let sampled_at = self.now;

        self.cycle += 1;
        self.now = self.now + self.config.clock_period_ps;

        self.source.on_edge(control).apply(&mut self.wires);
        let event = self.sink.on_edge(control, sample, sampled_at);

        if let Some(trace) = &mut self.trace {
            trace.push(self.wires);
        }
        trace!(
            cycle = self.cycle,
            d = self.wires.d,
            er = self.wires.er,
            dv = self.wires.dv,
            transmitting = matches!(self.source.state(), SourceState::Transmit(_)),
            "edge"
        );

        StepReport { cycle: self.cycle, driven: self.wires, event }
    }

    /// Step `n` edges.
    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Step until `done` holds, checking before each edge.
    ///
    /// Returns the number of edges simulated.
    ///
    /// # Errors
    ///
    /// `HarnessError::Timeout` if `done` still fails after `max_cycles`.
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Self) -> bool,
        max_cycles: u64,
    ) -> Result<u64, HarnessError> {
        let start = self.cycle;
        while !done(self) {
            if self.cycle - start >= max_cycles {
                return Err(HarnessError::Timeout { cycles: max_cycles });
            }
            self.step();
        }
        Ok(self.cycle - start)
    }

    /// Step until every queued frame has been delivered to the sink.
    ///
    /// # Errors
    ///
    /// `HarnessError::Timeout` if the link is still busy after `max_cycles`.
    pub fn run_to_quiescence(&mut self, max_cycles: u64) -> Result<u64, HarnessError> {
        self.run_until(Self::is_quiescent, max_cycles)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("cycle", &self.cycle)
            .field("now", &self.now)
            .field("wires", &self.wires)
            .field("reset", &self.reset)
            .field("enable", &self.enable)
            .field("source", &self.source.state())
            .field("sink_queued", &self.sink.count())
            .finish_non_exhaustive()
    }
}
