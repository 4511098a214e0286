//! Receive state machine.
//!
//! The sink watches the frame-active line. A frame starts on the first cycle
//! it samples high and ends on the first cycle it samples low; every byte in
//! between is collected along with its error bit. Completed frames are
//! compacted (all-clear error markers dropped) and queued for the consumer.
//!
//! # State Machine
//!
//! ```text
//!              dv high                      dv high
//!  ┌──────┐  ───────────>  ┌───────────┐ ──────────┐
//!  │ Idle │                │ Receiving │<──────────┘
//!  └──────┘  <───────────  └───────────┘
//!      ▲       dv low: queue frame
//!      │
//!  ┌───────┐
//!  │ Reset │<──── reset asserted (partial frame discarded)
//!  └───────┘
//! ```
//!
//! The sink reads only values sampled before the edge, so a source sharing
//! the clock can update the bus at the same edge without racing it.

use gmii_proto::{GmiiFrame, GmiiSignals, Result, SimTime};
use tracing::{debug, info};

use crate::{
    bus::{BusLayout, ResolvedBus},
    control::Control,
    queue::{FrameQueue, Occupancy},
};

/// Reported when a frame completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// A frame was queued
    FrameReceived {
        /// Frame length in bytes
        len: usize,
        /// Time the first byte was sampled
        rx_sim_time: SimTime,
    },
}

/// Sink state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkState {
    /// Reset asserted on the last edge
    Reset,
    /// Waiting for a frame
    Idle,
    /// Collecting bytes
    Receiving(GmiiFrame),
}

/// GMII frame sink.
#[derive(Debug, Clone)]
pub struct GmiiSink {
    bus: ResolvedBus,
    queue: FrameQueue,
    state: SinkState,
}

/// Passive observer of a GMII bus. Same behavior as [`GmiiSink`].
pub type GmiiMonitor = GmiiSink;

impl GmiiSink {
    /// Create a sink for the given bus.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the layout is malformed or has no
    /// frame-active line.
    pub fn new(layout: &BusLayout) -> Result<Self> {
        let bus = layout.resolve()?;
        bus.require_frame_active()?;
        Ok(Self { bus, queue: FrameQueue::new(), state: SinkState::Idle })
    }

    /// Take the oldest received frame.
    pub fn recv(&mut self) -> Option<GmiiFrame> {
        self.queue.pop()
    }

    /// Frames waiting to be collected.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    /// True if no frame is waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// True if no frame is being received right now.
    pub fn is_idle(&self) -> bool {
        !matches!(self.state, SinkState::Receiving(_))
    }

    /// Queue counters.
    pub fn queue_occupancy(&self) -> Occupancy {
        self.queue.occupancy()
    }

    /// Receive queue.
    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Current state.
    pub fn state(&self) -> &SinkState {
        &self.state
    }

    /// Resolved bus layout.
    pub fn bus(&self) -> ResolvedBus {
        self.bus
    }

    /// Advance one clock edge.
    ///
    /// `control` and `sample` must both be read before the edge. `now` is the
    /// simulation time of that sampling phase, before the clock advances; it
    /// is recorded as the receive time of a frame that starts on this edge.
    pub fn on_edge(
        &mut self,
        control: Control,
        sample: GmiiSignals,
        now: SimTime,
    ) -> Option<SinkEvent> {
        if control.reset {
            if let SinkState::Receiving(frame) = &self.state {
                debug!(len = frame.len(), "reset discarded partial frame");
            }
            self.state = SinkState::Reset;
            return None;
        }

        if !control.enable {
            return None;
        }

        let sample = self.bus.mask(sample);
        let state = std::mem::replace(&mut self.state, SinkState::Idle);

        let (next, event) = match state {
            SinkState::Idle | SinkState::Reset if sample.dv => {
                let mut frame = GmiiFrame::new(vec![sample.d]);
                frame.error = Some(vec![sample.er]);
                frame.rx_sim_time = Some(now);
                (SinkState::Receiving(frame), None)
            },
            SinkState::Idle | SinkState::Reset => (SinkState::Idle, None),
            SinkState::Receiving(mut frame) if sample.dv => {
                frame.data.push(sample.d);
                frame.error.get_or_insert_with(Vec::new).push(sample.er);
                (SinkState::Receiving(frame), None)
            },
            SinkState::Receiving(frame) => (SinkState::Idle, Some(self.complete(frame))),
        };

        self.state = next;
        event
    }

    fn complete(&mut self, mut frame: GmiiFrame) -> SinkEvent {
        frame.compact();
        let rx_sim_time = frame.rx_sim_time.unwrap_or_default();
        let len = frame.len();
        info!(len, error = frame.has_error(), %rx_sim_time, "RX frame: {frame:?}");

        self.queue.push(frame);
        SinkEvent::FrameReceived { len, rx_sim_time }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> GmiiSink {
        GmiiSink::new(&BusLayout::gmii()).unwrap()
    }

    /// Feed one sample per cycle, 8 ns apart.
    fn feed(sink: &mut GmiiSink, control: Control, samples: &[GmiiSignals]) -> Vec<SinkEvent> {
        samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| sink.on_edge(control, *s, SimTime::from_ns(8 * i as u64)))
            .collect()
    }

    fn bytes(data: &[u8]) -> Vec<GmiiSignals> {
        data.iter().map(|&d| GmiiSignals::byte(d, false)).collect()
    }

    #[test]
    fn assembles_frame_between_dv_edges() {
        let mut sink = sink();
        let mut samples = vec![GmiiSignals::IDLE];
        samples.extend(bytes(&[1, 2, 3]));
        samples.push(GmiiSignals::IDLE);

        let events = feed(&mut sink, Control::RUN, &samples);
        assert_eq!(
            events,
            vec![SinkEvent::FrameReceived { len: 3, rx_sim_time: SimTime::from_ns(8) }]
        );

        let frame = sink.recv().unwrap();
        assert_eq!(frame.data, vec![1, 2, 3]);
        assert!(frame.error.is_none());
        assert_eq!(frame.rx_sim_time, Some(SimTime::from_ns(8)));
        assert!(sink.recv().is_none());
    }

    #[test]
    fn idle_only_while_not_receiving() {
        let mut sink = sink();
        assert!(sink.is_idle());
        sink.on_edge(Control::RUN, GmiiSignals::byte(1, false), SimTime::ZERO);
        assert!(!sink.is_idle());
        assert!(sink.is_empty());
        sink.on_edge(Control::RUN, GmiiSignals::IDLE, SimTime::ZERO);
        assert!(sink.is_idle());
        assert_eq!(sink.count(), 1);
    }

    #[test]
    fn error_bits_are_kept_per_byte() {
        let mut sink = sink();
        let samples = [
            GmiiSignals::byte(1, false),
            GmiiSignals::byte(2, true),
            GmiiSignals::byte(3, false),
            GmiiSignals::IDLE,
        ];
        feed(&mut sink, Control::RUN, &samples);

        let frame = sink.recv().unwrap();
        assert_eq!(frame.error, Some(vec![false, true, false]));
    }

    #[test]
    fn unwired_error_line_reads_low() {
        let mut sink = GmiiSink::new(&BusLayout::gmii().without_error()).unwrap();
        feed(&mut sink, Control::RUN, &[GmiiSignals::byte(1, true), GmiiSignals::IDLE]);
        assert!(sink.recv().unwrap().error.is_none());
    }

    #[test]
    fn back_to_back_frames_need_one_idle_cycle() {
        let mut sink = sink();
        let mut samples = bytes(&[1, 2]);
        samples.push(GmiiSignals::IDLE);
        samples.extend(bytes(&[3]));
        samples.push(GmiiSignals::IDLE);

        let events = feed(&mut sink, Control::RUN, &samples);
        assert_eq!(events.len(), 2);
        assert_eq!(sink.queue_occupancy(), Occupancy { bytes: 3, frames: 2 });
        assert_eq!(sink.recv().unwrap().data, vec![1, 2]);
        assert_eq!(sink.recv().unwrap().data, vec![3]);
    }

    #[test]
    fn clock_enable_freezes_reception() {
        let mut sink = sink();
        sink.on_edge(Control::RUN, GmiiSignals::byte(1, false), SimTime::ZERO);
        // Samples taken while disabled are ignored, even a dv drop.
        sink.on_edge(Control::HOLD, GmiiSignals::IDLE, SimTime::ZERO);
        sink.on_edge(Control::HOLD, GmiiSignals::byte(9, false), SimTime::ZERO);
        sink.on_edge(Control::RUN, GmiiSignals::byte(2, false), SimTime::ZERO);
        sink.on_edge(Control::RUN, GmiiSignals::IDLE, SimTime::ZERO);

        assert_eq!(sink.recv().unwrap().data, vec![1, 2]);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let mut sink = sink();
        feed(&mut sink, Control::RUN, &bytes(&[1, 2, 3]));
        assert!(!sink.is_idle());

        assert_eq!(sink.on_edge(Control::RESET, GmiiSignals::byte(4, false), SimTime::ZERO), None);
        assert_eq!(sink.state(), &SinkState::Reset);

        // dv falling after reset does not produce a frame.
        feed(&mut sink, Control::RUN, &[GmiiSignals::IDLE]);
        assert!(sink.is_empty());
        assert!(sink.queue().is_consistent());
    }

    #[test]
    fn frame_starting_right_after_reset_is_received() {
        let mut sink = sink();
        sink.on_edge(Control::RESET, GmiiSignals::IDLE, SimTime::ZERO);
        feed(&mut sink, Control::RUN, &[GmiiSignals::byte(5, false), GmiiSignals::IDLE]);
        assert_eq!(sink.recv().unwrap().data, vec![5]);
    }

    #[test]
    fn requires_frame_active_line() {
        let layout = BusLayout { valid: None, ..BusLayout::gmii() };
        assert_eq!(
            GmiiSink::new(&layout).err(),
            Some(gmii_proto::ConfigError::MissingSignal("dv"))
        );
        let sink = GmiiSink::new(&BusLayout::gmii().with_enable()).unwrap();
        assert_eq!(sink.bus().frame_active, Some(crate::bus::FrameActive::Enable));
    }
}
