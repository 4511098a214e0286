//! Per-cycle control inputs.

/// Control lines sampled before a clock edge.
///
/// An unwired reset reads as de-asserted; an unwired clock enable reads as
/// asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    /// Active-high synchronous reset
    pub reset: bool,
    /// Clock enable; when low the state machines hold for the cycle
    pub enable: bool,
}

impl Control {
    /// Normal operation: out of reset, enabled.
    pub const RUN: Self = Self { reset: false, enable: true };

    /// Reset asserted.
    pub const RESET: Self = Self { reset: true, enable: true };

    /// Clock enable de-asserted.
    pub const HOLD: Self = Self { reset: false, enable: false };
}

impl Default for Control {
    fn default() -> Self {
        Self::RUN
    }
}
