//! Transmit state machine.
//!
//! The source owns a queue of frames and puts them on the bus one byte per
//! clock cycle, with `dv` high for every byte of a frame and low in between.
//!
//! # State Machine
//!
//! ```text
//!                    queue non-empty
//!  ┌───────┐  ───────────────────────────────>  ┌──────────┐
//!  │ Idle  │                                    │ Transmit │──┐ more bytes
//!  └───────┘  <──────┐                          └──────────┘<─┘
//!      ▲             │ gap elapsed                   │ last byte
//!      │         ┌───────┐                           │
//!      │         │  Gap  │<──────────────────────────┘
//!      │         └───────┘
//!      │ reset released
//!  ┌───────┐
//!  │ Reset │<──── reset asserted (from any state, frame in flight dropped)
//!  └───────┘
//! ```
//!
//! A frame is dequeued and its first byte driven in the same cycle, so after
//! a gap of G cycles the next frame starts on cycle G + 1 after the last byte
//! of the previous one.
//!
//! # Timing
//!
//! [`GmiiSource::on_edge`] is called once per clock edge with the control
//! inputs sampled just before the edge. The returned [`SourceAction`] is what
//! the bus carries until the following edge.

use gmii_proto::{GmiiFrame, GmiiSignals, Result};
use tracing::{debug, info, warn};

use crate::{
    bus::{BusLayout, ResolvedBus},
    control::Control,
    queue::{FrameQueue, Occupancy},
};

/// Default inter-frame gap in cycles (the Ethernet 96-bit-time minimum).
pub const DEFAULT_IFG: u32 = 12;

/// Source configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceConfig {
    /// Idle cycles between frames. 0 is treated as 1, since `dv` must drop
    /// for at least one cycle for the far end to see a frame boundary.
    pub ifg: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { ifg: DEFAULT_IFG }
    }
}

/// What to put on the bus for the coming cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAction {
    /// Drive these values
    Drive(GmiiSignals),
    /// Leave the bus as it is (clock enable low)
    Hold,
}

impl SourceAction {
    /// Apply to a set of wires.
    pub fn apply(self, wires: &mut GmiiSignals) {
        if let Self::Drive(signals) = self {
            *wires = signals;
        }
    }
}

/// Position within a frame being transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxCursor {
    frame: GmiiFrame,
    pos: usize,
}

impl TxCursor {
    /// Start at the first byte. Error markers are normalized so every byte
    /// has one.
    pub fn new(mut frame: GmiiFrame) -> Self {
        frame.normalize();
        Self { frame, pos: 0 }
    }

    /// Frame being transmitted.
    pub fn frame(&self) -> &GmiiFrame {
        &self.frame
    }

    /// Bytes already driven.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to drive.
    pub fn remaining(&self) -> usize {
        self.frame.len() - self.pos
    }

    /// Take the next byte and its error marker.
    fn advance(&mut self) -> Option<GmiiSignals> {
        let d = *self.frame.data.get(self.pos)?;
        let er = self.frame.error_at(self.pos);
        self.pos += 1;
        Some(GmiiSignals::byte(d, er))
    }
}

/// Source state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceState {
    /// Reset asserted on the last edge
    Reset,
    /// Nothing to send
    Idle,
    /// Inter-frame gap in progress
    Gap {
        /// Idle cycles still to go
        remaining: u32,
    },
    /// Frame on the wire
    Transmit(TxCursor),
}

/// GMII frame source.
#[derive(Debug, Clone)]
pub struct GmiiSource {
    bus: ResolvedBus,
    config: SourceConfig,
    queue: FrameQueue,
    state: SourceState,
    active: bool,
}

impl GmiiSource {
    /// Create a source for the given bus.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the layout is malformed.
    pub fn new(layout: &BusLayout, config: SourceConfig) -> Result<Self> {
        let bus = layout.resolve()?;
        Ok(Self { bus, config, queue: FrameQueue::new(), state: SourceState::Idle, active: false })
    }

    /// Queue a frame for transmission. Never blocks.
    pub fn send(&mut self, frame: impl Into<GmiiFrame>) {
        self.queue.push(frame.into());
    }

    /// Frames waiting in the queue (not counting one in flight).
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// True if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True if the queue is empty and nothing is being transmitted.
    pub fn is_idle(&self) -> bool {
        self.is_empty() && !self.active
    }

    /// Queue counters.
    pub fn queue_occupancy(&self) -> Occupancy {
        self.queue.occupancy()
    }

    /// Transmit queue.
    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Current state.
    pub fn state(&self) -> &SourceState {
        &self.state
    }

    /// Configured inter-frame gap.
    pub fn ifg(&self) -> u32 {
        self.config.ifg
    }

    /// Change the inter-frame gap. Takes effect at the end of the next frame.
    pub fn set_ifg(&mut self, ifg: u32) {
        self.config.ifg = ifg;
    }

    /// Resolved bus layout.
    pub fn bus(&self) -> ResolvedBus {
        self.bus
    }

    /// Advance one clock edge.
    ///
    /// `control` must be sampled before the edge.
    pub fn on_edge(&mut self, control: Control) -> SourceAction {
        if control.reset {
            if let SourceState::Transmit(cursor) = &self.state {
                debug!(
                    sent = cursor.position(),
                    dropped = cursor.remaining(),
                    "reset dropped frame in flight"
                );
            }
            self.state = SourceState::Reset;
            self.active = false;
            return SourceAction::Drive(GmiiSignals::IDLE);
        }

        if !control.enable {
            return SourceAction::Hold;
        }

        let state = std::mem::replace(&mut self.state, SourceState::Idle);
        let (next, out) = match state {
            SourceState::Gap { remaining } => {
                let remaining = remaining.saturating_sub(1);
                let next =
                    if remaining == 0 { SourceState::Idle } else { SourceState::Gap { remaining } };
                (next, None)
            },
            SourceState::Transmit(cursor) => self.transmit(cursor),
            SourceState::Idle | SourceState::Reset => match self.dequeue() {
                Some(cursor) => self.transmit(cursor),
                None => (SourceState::Idle, None),
            },
        };
        self.state = next;

        match out {
            Some(signals) => {
                self.active = true;
                SourceAction::Drive(self.bus.mask(signals))
            },
            None => {
                self.active = false;
                SourceAction::Drive(GmiiSignals::IDLE)
            },
        }
    }

    /// Pop the next frame worth sending.
    fn dequeue(&mut self) -> Option<TxCursor> {
        while let Some(frame) = self.queue.pop() {
            if frame.is_empty() {
                warn!("dropping empty frame");
                continue;
            }
            info!(len = frame.len(), error = frame.has_error(), "TX frame: {frame:?}");
            return Some(TxCursor::new(frame));
        }
        None
    }

    /// Drive one byte from `cursor` and decide what follows it.
    fn transmit(&self, mut cursor: TxCursor) -> (SourceState, Option<GmiiSignals>) {
        let out = cursor.advance();
        let next = if cursor.remaining() == 0 {
            SourceState::Gap { remaining: self.config.ifg.max(1) }
        } else {
            SourceState::Transmit(cursor)
        };
        (next, out)
    }
}
