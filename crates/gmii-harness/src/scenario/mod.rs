//! Scenario-based testing with mandatory oracles.
//!
//! A scenario describes a link configuration and a list of payloads, runs
//! them through a [`World`](crate::World) until the link goes quiet, and
//! hands everything that came out the other side to an oracle. The oracle is
//! required: a scenario that cannot fail is not a test.

mod builder;

pub use builder::{RunnableScenario, Scenario};
use gmii_proto::GmiiFrame;

/// What a finished scenario produced.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// Scenario name
    pub name: String,
    /// Frames queued at the source, in order
    pub sent: Vec<GmiiFrame>,
    /// Frames collected from the sink, in order
    pub received: Vec<GmiiFrame>,
    /// Edges simulated
    pub cycles: u64,
}

/// Oracle deciding whether a scenario passed.
pub type OracleFn = Box<dyn Fn(&ScenarioOutcome) -> Result<(), String>>;

/// Every sent frame arrived byte-identical, in order, without error
/// markers, and nothing else arrived.
pub fn exact_delivery(outcome: &ScenarioOutcome) -> Result<(), String> {
    if outcome.sent.len() != outcome.received.len() {
        return Err(format!(
            "Scenario '{}': sent {} frames, received {}",
            outcome.name,
            outcome.sent.len(),
            outcome.received.len()
        ));
    }

    for (i, (tx, rx)) in outcome.sent.iter().zip(&outcome.received).enumerate() {
        if rx.payload() != tx.payload() {
            return Err(format!(
                "Scenario '{}': frame {} payload mismatch ({} bytes sent, {} received)",
                outcome.name,
                i,
                tx.payload().len(),
                rx.payload().len()
            ));
        }
        if rx.error.is_some() {
            return Err(format!("Scenario '{}': frame {} carries error markers", outcome.name, i));
        }
    }

    Ok(())
}

/// Receive timestamps are present and strictly increasing.
pub fn rx_times_increasing(outcome: &ScenarioOutcome) -> Result<(), String> {
    let mut last = None;
    for (i, frame) in outcome.received.iter().enumerate() {
        let Some(t) = frame.rx_sim_time else {
            return Err(format!("Scenario '{}': frame {} has no receive time", outcome.name, i));
        };
        if last.is_some_and(|prev| t <= prev) {
            return Err(format!("Scenario '{}': frame {} received out of order", outcome.name, i));
        }
        last = Some(t);
    }
    Ok(())
}

/// Combine oracles; the first failure wins.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |outcome| oracles.iter().try_for_each(|oracle| oracle(outcome)))
}
