//! Simulation time.

use std::{fmt, ops::Add};

/// Monotonic simulation timestamp in picoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero.
    pub const ZERO: Self = Self(0);

    /// Create from picoseconds.
    pub const fn from_ps(ps: u64) -> Self {
        Self(ps)
    }

    /// Create from nanoseconds.
    pub const fn from_ns(ns: u64) -> Self {
        Self(ns * 1_000)
    }

    /// Picoseconds since time zero.
    pub const fn as_ps(self) -> u64 {
        self.0
    }

    /// Whole nanoseconds since time zero.
    pub const fn as_ns(self) -> u64 {
        self.0 / 1_000
    }
}

impl Add<u64> for SimTime {
    type Output = Self;

    /// Advance by a number of picoseconds.
    fn add(self, ps: u64) -> Self {
        Self(self.0.saturating_add(ps))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1_000 == 0 {
            write!(f, "{} ns", self.0 / 1_000)
        } else {
            write!(f, "{} ps", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_picks_unit() {
        assert_eq!(SimTime::from_ns(16).to_string(), "16 ns");
        assert_eq!(SimTime::from_ps(1_500).to_string(), "1500 ps");
    }

    #[test]
    fn add_saturates() {
        assert_eq!(SimTime::from_ps(u64::MAX) + 1, SimTime::from_ps(u64::MAX));
        assert_eq!((SimTime::ZERO + 8_000).as_ns(), 8);
        assert_eq!(SimTime::from_ns(3).as_ps(), 3_000);
    }
}
