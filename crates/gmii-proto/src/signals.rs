//! Per-cycle bus values.

/// Values on the GMII lines during one clock cycle.
///
/// Unwired optional lines read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GmiiSignals {
    /// Data byte (`d`, 8 bits)
    pub d: u8,
    /// Error marker (`er`, 1 bit)
    pub er: bool,
    /// Data valid / frame active (`dv` or `en`, 1 bit)
    pub dv: bool,
}

impl GmiiSignals {
    /// All lines low. What the source drives between frames and in reset.
    pub const IDLE: Self = Self { d: 0, er: false, dv: false };

    /// A valid data byte with its error marker.
    pub const fn byte(d: u8, er: bool) -> Self {
        Self { d, er, dv: true }
    }

    /// True if this cycle carries a frame byte.
    pub const fn is_valid(&self) -> bool {
        self.dv
    }
}
