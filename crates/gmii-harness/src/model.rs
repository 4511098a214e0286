//! Reference model of a clean link.
//!
//! Computes, without running any state machine, what the source should put
//! on the wire for a list of frames queued before the first edge, and what
//! the sink should hand back. Property tests compare the real world against
//! these.

use gmii_proto::{GmiiFrame, GmiiSignals};

/// Bus values for every edge until the last frame's gap has elapsed.
///
/// Assumes reset low, clock enable high and all frames queued up front.
/// Empty frames are skipped, as the source does.
pub fn expected_trace(frames: &[GmiiFrame], ifg: u32) -> Vec<GmiiSignals> {
    let gap = ifg.max(1) as usize;
    let mut trace = Vec::new();
    for frame in frames.iter().filter(|f| !f.is_empty()) {
        let mut frame = frame.clone();
        frame.normalize();
        trace.extend(
            frame.iter().enumerate().map(|(i, &d)| GmiiSignals::byte(d, frame.error_at(i))),
        );
        trace.extend(std::iter::repeat_n(GmiiSignals::IDLE, gap));
    }
    trace
}

/// Frames the sink should produce, in order, with canonical error markers.
pub fn expected_rx(frames: &[GmiiFrame]) -> Vec<GmiiFrame> {
    frames
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| {
            let mut frame = GmiiFrame::new(f.data.clone());
            frame.error.clone_from(&f.error);
            frame.normalize();
            frame.compact();
            frame
        })
        .collect()
}
