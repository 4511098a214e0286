//! Bus layout and construction-time validation.
//!
//! A GMII bus always has an 8-bit data line. The error line and the
//! frame-active line are optional, and the frame-active line may be wired as
//! either `en` (transmit side naming) or `dv` (receive side naming). The
//! layout is checked once, when a source or sink is built, and the two names
//! are collapsed into a single [`FrameActive`] choice. After that no code
//! path needs to know which name was used.

use gmii_proto::{ConfigError, DATA_WIDTH, GmiiSignals, Result};

/// A wired signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSpec {
    /// Width in bits
    pub width: u32,
}

impl SignalSpec {
    /// Signal of the given width.
    pub const fn bits(width: u32) -> Self {
        Self { width }
    }

    /// Single-bit signal.
    pub const fn bit() -> Self {
        Self { width: 1 }
    }
}

/// Which physical line carries the frame-active indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameActive {
    /// `en` (transmit enable)
    Enable,
    /// `dv` (data valid)
    Valid,
}

/// Signals wired to a source or sink, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusLayout {
    /// `d`, required
    pub data: SignalSpec,
    /// `er`
    pub error: Option<SignalSpec>,
    /// `en`; takes precedence over `dv` when both are wired
    pub enable: Option<SignalSpec>,
    /// `dv`
    pub valid: Option<SignalSpec>,
}

impl BusLayout {
    /// Full GMII wiring: `d`, `er`, `dv`.
    pub const fn gmii() -> Self {
        Self {
            data: SignalSpec::bits(DATA_WIDTH),
            error: Some(SignalSpec::bit()),
            enable: None,
            valid: Some(SignalSpec::bit()),
        }
    }

    /// Drop the error line.
    #[must_use]
    pub const fn without_error(mut self) -> Self {
        self.error = None;
        self
    }

    /// Wire the frame-active line as `en` instead of `dv`.
    #[must_use]
    pub const fn with_enable(mut self) -> Self {
        self.enable = Some(SignalSpec::bit());
        self.valid = None;
        self
    }

    /// Check widths and resolve the frame-active alias.
    ///
    /// # Errors
    ///
    /// `ConfigError::WidthMismatch` if `d` is not 8 bits or any optional line
    /// is not 1 bit.
    pub fn resolve(&self) -> Result<ResolvedBus> {
        check_width("d", self.data, DATA_WIDTH)?;
        for (name, spec) in [("er", self.error), ("en", self.enable), ("dv", self.valid)] {
            if let Some(spec) = spec {
                check_width(name, spec, 1)?;
            }
        }

        let frame_active = if self.enable.is_some() {
            Some(FrameActive::Enable)
        } else if self.valid.is_some() {
            Some(FrameActive::Valid)
        } else {
            None
        };

        Ok(ResolvedBus { has_error: self.error.is_some(), frame_active })
    }
}

impl Default for BusLayout {
    fn default() -> Self {
        Self::gmii()
    }
}

fn check_width(signal: &'static str, spec: SignalSpec, expected: u32) -> Result<()> {
    if spec.width == expected {
        Ok(())
    } else {
        Err(ConfigError::WidthMismatch { signal, expected, actual: spec.width })
    }
}

/// Validated bus layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedBus {
    /// `er` is wired
    pub has_error: bool,
    /// Line carrying frame-active, if any
    pub frame_active: Option<FrameActive>,
}

impl ResolvedBus {
    /// Clear the lines this bus does not have.
    ///
    /// Used on the source side so unwired outputs are never driven, and on
    /// the sink side so unwired inputs read as low.
    pub fn mask(&self, signals: GmiiSignals) -> GmiiSignals {
        GmiiSignals {
            d: signals.d,
            er: self.has_error && signals.er,
            dv: self.frame_active.is_some() && signals.dv,
        }
    }

    /// Fail unless a frame-active line is wired.
    pub(crate) fn require_frame_active(&self) -> Result<FrameActive> {
        self.frame_active.ok_or(ConfigError::MissingSignal("dv"))
    }
}
