//! GMII frame.
//!
//! A frame is the unit the source transmits and the sink reassembles: the raw
//! bytes seen on `d` between a rising and falling edge of `dv`, including the
//! Ethernet preamble. Error markers are optional and, when present, align
//! one-to-one with the bytes.
//!
//! # Error marker canonical forms
//!
//! - [`GmiiFrame::normalize`] expands markers to exactly one per byte. A
//!   truncated marker list is extended by repeating its last value, so an
//!   error that was asserted at the end of the list stays asserted until the
//!   end of the frame.
//! - [`GmiiFrame::compact`] collapses an all-clear marker list back to `None`,
//!   so "no errors" has a single representation.

use std::{fmt, slice};

use crate::{constants::ETH_PREAMBLE, time::SimTime};

/// Length of the Ethernet preamble at the start of every frame.
pub const PREAMBLE_LEN: usize = ETH_PREAMBLE.len();

/// Frame carried on a GMII link.
///
/// Equality compares `data` only. Error markers and receive time are
/// metadata.
#[derive(Clone, Default)]
pub struct GmiiFrame {
    /// Frame bytes, preamble included
    pub data: Vec<u8>,
    /// Per-byte error markers, `None` when the frame is error-free
    pub error: Option<Vec<bool>>,
    /// Simulation time of the first byte, set by the sink
    pub rx_sim_time: Option<SimTime>,
}

impl GmiiFrame {
    /// Create a frame from raw bytes with no error markers.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into(), error: None, rx_sim_time: None }
    }

    /// Create a frame with per-byte error markers.
    ///
    /// The markers do not have to match the data length; the source
    /// normalizes them when the frame is dequeued.
    pub fn with_error(data: impl Into<Vec<u8>>, error: impl Into<Vec<bool>>) -> Self {
        Self { data: data.into(), error: Some(error.into()), rx_sim_time: None }
    }

    /// Build a frame by prepending the Ethernet preamble to `payload`.
    pub fn from_payload(payload: impl AsRef<[u8]>) -> Self {
        let payload = payload.as_ref();
        let mut data = Vec::with_capacity(PREAMBLE_LEN + payload.len());
        data.extend_from_slice(&ETH_PREAMBLE);
        data.extend_from_slice(payload);
        Self::new(data)
    }

    /// First eight bytes of the frame (fewer if the frame is shorter).
    pub fn preamble(&self) -> &[u8] {
        &self.data[..self.data.len().min(PREAMBLE_LEN)]
    }

    /// Everything after the preamble.
    pub fn payload(&self) -> &[u8] {
        &self.data[self.data.len().min(PREAMBLE_LEN)..]
    }

    /// Number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the frame has no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if any byte carries an error marker.
    pub fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|e| e.iter().any(|&er| er))
    }

    /// Error marker for byte `index`. Absent markers read as `false`.
    pub fn error_at(&self, index: usize) -> bool {
        self.error.as_ref().and_then(|e| e.get(index)).copied().unwrap_or(false)
    }

    /// Make `error` hold exactly one marker per data byte.
    ///
    /// Longer lists are truncated. Shorter lists are padded with their last
    /// value (`false` for an empty list). An absent list becomes all-clear.
    /// Idempotent.
    pub fn normalize(&mut self) {
        let n = self.data.len();
        match &mut self.error {
            Some(error) => {
                let fill = error.last().copied().unwrap_or(false);
                error.resize(n, fill);
            },
            None => self.error = Some(vec![false; n]),
        }
    }

    /// Drop `error` if no marker is set.
    pub fn compact(&mut self) {
        if !self.has_error() {
            self.error = None;
        }
    }

    /// Iterate over the frame bytes.
    pub fn iter(&self) -> slice::Iter<'_, u8> {
        self.data.iter()
    }
}

impl PartialEq for GmiiFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for GmiiFrame {}

impl fmt::Debug for GmiiFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmiiFrame")
            .field("len", &self.data.len())
            .field("data", &HexBytes(&self.data))
            .field("error", &self.error.as_ref().map(|e| e.iter().filter(|&&er| er).count()))
            .field("rx_sim_time", &self.rx_sim_time)
            .finish()
    }
}

/// Hex dump capped at the first 32 bytes, so logging a jumbo frame stays
/// readable.
struct HexBytes<'a>(&'a [u8]);

impl fmt::Debug for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 32;
        for (i, b) in self.0.iter().take(SHOWN).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02x}")?;
        }
        if self.0.len() > SHOWN {
            write!(f, " .. (+{} bytes)", self.0.len() - SHOWN)?;
        }
        Ok(())
    }
}

impl From<Vec<u8>> for GmiiFrame {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for GmiiFrame {
    fn from(data: &[u8]) -> Self {
        Self::new(data)
    }
}

impl<const N: usize> From<&[u8; N]> for GmiiFrame {
    fn from(data: &[u8; N]) -> Self {
        Self::new(data.as_slice())
    }
}

impl<'a> IntoIterator for &'a GmiiFrame {
    type Item = &'a u8;
    type IntoIter = slice::Iter<'a, u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn from_payload_prepends_preamble() {
        let frame = GmiiFrame::from_payload([1u8, 2, 3]);
        assert_eq!(frame.len(), 11);
        assert_eq!(frame.preamble(), &ETH_PREAMBLE);
        assert_eq!(frame.payload(), &[1, 2, 3]);
        assert!(frame.error.is_none());
        assert!(frame.rx_sim_time.is_none());
    }

    #[test]
    fn short_frame_slices_do_not_panic() {
        let frame = GmiiFrame::new(vec![0x55u8, 0x55]);
        assert_eq!(frame.preamble(), &[0x55, 0x55]);
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn equality_ignores_metadata() {
        let a = GmiiFrame::with_error(vec![1u8, 2], vec![true, false]);
        let mut b = GmiiFrame::new(vec![1u8, 2]);
        b.rx_sim_time = Some(SimTime::from_ns(10));
        assert_eq!(a, b);
        assert_ne!(a, GmiiFrame::new(vec![1u8, 2, 3]));
    }

    #[test]
    fn normalize_pads_with_last_marker() {
        let mut frame = GmiiFrame::with_error(vec![0u8; 5], vec![false, true]);
        frame.normalize();
        assert_eq!(frame.error, Some(vec![false, true, true, true, true]));
    }

    #[test]
    fn normalize_truncates_long_markers() {
        let mut frame = GmiiFrame::with_error(vec![0u8; 2], vec![true, false, true]);
        frame.normalize();
        assert_eq!(frame.error, Some(vec![true, false]));
    }

    #[test]
    fn normalize_empty_marker_list_pads_clear() {
        let mut frame = GmiiFrame::with_error(vec![0u8; 3], Vec::<bool>::new());
        frame.normalize();
        assert_eq!(frame.error, Some(vec![false; 3]));
    }

    #[test]
    fn normalize_absent_builds_clear_markers() {
        let mut frame = GmiiFrame::new(vec![9u8; 4]);
        frame.normalize();
        assert_eq!(frame.error, Some(vec![false; 4]));
        frame.compact();
        assert!(frame.error.is_none());
    }

    #[test]
    fn compact_keeps_real_errors() {
        let mut frame = GmiiFrame::with_error(vec![0u8; 3], vec![false, false, true]);
        frame.compact();
        assert!(frame.has_error());
        assert!(frame.error_at(2));
        assert!(!frame.error_at(7));
    }

    #[test]
    fn conversions() {
        let from_array = GmiiFrame::from(&[1u8, 2, 3]);
        let from_slice = GmiiFrame::from(&[1u8, 2, 3][..]);
        let from_vec = GmiiFrame::from(vec![1u8, 2, 3]);
        assert_eq!(from_array, from_slice);
        assert_eq!(from_slice, from_vec);
        assert_eq!(from_vec.iter().copied().sum::<u8>(), 6);
    }

    #[test]
    fn debug_truncates_long_frames() {
        let frame = GmiiFrame::new(vec![0xABu8; 100]);
        let rendered = format!("{frame:?}");
        assert!(rendered.contains("(+68 bytes)"));
        assert!(rendered.contains("len: 100"));
    }

    proptest! {
        #[test]
        fn prop_normalize_idempotent(
            data in prop::collection::vec(any::<u8>(), 0..64),
            error in prop::option::of(prop::collection::vec(any::<bool>(), 0..80)),
        ) {
            let mut once = GmiiFrame { data, error, rx_sim_time: None };
            once.normalize();
            let mut twice = once.clone();
            twice.normalize();

            prop_assert_eq!(&once.error, &twice.error);
            prop_assert_eq!(once.error.as_ref().map(Vec::len), Some(once.len()));
        }

        #[test]
        fn prop_compact_after_normalize_preserves_errors(
            data in prop::collection::vec(any::<u8>(), 1..64),
            error in prop::collection::vec(any::<bool>(), 1..64),
        ) {
            let mut frame = GmiiFrame::with_error(data, error);
            frame.normalize();
            let had_error = frame.has_error();
            frame.compact();

            prop_assert_eq!(frame.error.is_some(), had_error);
        }
    }
}
