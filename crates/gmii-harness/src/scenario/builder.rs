//! Scenario builder API.

use gmii_core::{BusLayout, GmiiSink, GmiiSource, SourceConfig};
use gmii_proto::GmiiFrame;
use tracing::info;

use crate::{
    dut::Pipeline,
    scenario::{OracleFn, ScenarioOutcome},
    stimulus::ClockEnable,
    world::{SimConfig, World},
};

/// Default simulation limit.
const DEFAULT_MAX_CYCLES: u64 = 1_000_000;

/// Scenario builder.
///
/// Configure the link and payloads, then call `.oracle()` to get a
/// [`RunnableScenario`].
pub struct Scenario {
    name: String,
    source_config: SourceConfig,
    tx_layout: BusLayout,
    rx_layout: BusLayout,
    frames: Vec<GmiiFrame>,
    latency: usize,
    clock_enable: ClockEnable,
    sim: SimConfig,
    max_cycles: u64,
}

impl Scenario {
    /// Create a scenario on a standard GMII loopback with default gap.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_config: SourceConfig::default(),
            tx_layout: BusLayout::gmii(),
            rx_layout: BusLayout::gmii(),
            frames: Vec::new(),
            latency: 0,
            clock_enable: ClockEnable::Unwired,
            sim: SimConfig::default(),
            max_cycles: DEFAULT_MAX_CYCLES,
        }
    }

    /// Set the inter-frame gap.
    pub fn ifg(mut self, ifg: u32) -> Self {
        self.source_config.ifg = ifg;
        self
    }

    /// Queue one payload; the preamble is added.
    pub fn payload(mut self, payload: impl AsRef<[u8]>) -> Self {
        self.frames.push(GmiiFrame::from_payload(payload));
        self
    }

    /// Queue several payloads in order.
    pub fn payloads<P: AsRef<[u8]>>(mut self, payloads: impl IntoIterator<Item = P>) -> Self {
        self.frames.extend(payloads.into_iter().map(GmiiFrame::from_payload));
        self
    }

    /// Queue a complete frame as-is (preamble, error markers and all).
    pub fn frame(mut self, frame: GmiiFrame) -> Self {
        self.frames.push(frame);
        self
    }

    /// Bus layouts for the source and sink ends.
    pub fn layouts(mut self, tx: BusLayout, rx: BusLayout) -> Self {
        self.tx_layout = tx;
        self.rx_layout = rx;
        self
    }

    /// Put a register pipeline of `depth` stages between the ends.
    pub fn pipeline(mut self, depth: usize) -> Self {
        self.latency = depth;
        self
    }

    /// Clock-enable pattern seen by both ends.
    pub fn clock_enable(mut self, pattern: ClockEnable) -> Self {
        self.clock_enable = pattern;
        self
    }

    /// Simulation parameters.
    pub fn sim_config(mut self, sim: SimConfig) -> Self {
        self.sim = sim;
        self
    }

    /// Give up after this many edges.
    pub fn max_cycles(mut self, max_cycles: u64) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// 1. Builds source and sink from the configured layouts
    /// 2. Queues every frame before the first edge
    /// 3. Steps the world, applying the clock-enable pattern, until the link
    ///    is quiescent
    /// 4. Drains the sink and runs the oracle on the outcome
    pub fn run(self) -> Result<ScenarioOutcome, String> {
        let Self { scenario, oracle } = self;
        let name = scenario.name;

        let source = GmiiSource::new(&scenario.tx_layout, scenario.source_config)
            .map_err(|e| format!("Scenario '{name}': source: {e}"))?;
        let sink = GmiiSink::new(&scenario.rx_layout)
            .map_err(|e| format!("Scenario '{name}': sink: {e}"))?;

        let mut world = World::new(source, sink)
            .with_dut(Pipeline::new(scenario.latency))
            .with_config(scenario.sim);

        for frame in &scenario.frames {
            world.source_mut().send(frame.clone());
        }

        let mut enable = scenario.clock_enable.generator();
        let mut received = Vec::with_capacity(scenario.frames.len());
        while !world.is_quiescent() {
            if world.cycle() >= scenario.max_cycles {
                return Err(format!(
                    "Scenario '{name}': link not quiescent after {} cycles",
                    scenario.max_cycles
                ));
            }
            world.set_enable(enable.next_enable());
            world.step();
            while let Some(frame) = world.sink_mut().recv() {
                received.push(frame);
            }
        }

        let outcome =
            ScenarioOutcome { name, sent: scenario.frames, received, cycles: world.cycle() };
        info!(
            scenario = %outcome.name,
            sent = outcome.sent.len(),
            received = outcome.received.len(),
            cycles = outcome.cycles,
            "scenario finished"
        );

        oracle(&outcome)?;
        Ok(outcome)
    }
}
