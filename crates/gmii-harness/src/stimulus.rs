//! Clock-enable stimulus.
//!
//! GMII-family interfaces run 10 and 100 Mb/s modes by keeping the 125 MHz
//! clock and pulsing a clock enable once every 10 or 100 cycles. Both ends
//! hold their state while the enable is low. These generators produce that
//! pattern, or a seeded random one for stress tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Clock-enable pattern for a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockEnable {
    /// Line not wired; every cycle is active
    #[default]
    Unwired,
    /// High one cycle in every `n` (10 for 100 Mb/s, 100 for 10 Mb/s)
    EveryNth(u32),
    /// High with the given probability (percent), from a seeded RNG
    Random {
        /// RNG seed
        seed: u64,
        /// Chance per cycle of the enable being high, 0..=100
        percent_high: u8,
    },
}

impl ClockEnable {
    /// Start generating the pattern.
    pub fn generator(self) -> EnableGenerator {
        let rng = match self {
            Self::Random { seed, .. } => Some(ChaCha8Rng::seed_from_u64(seed)),
            _ => None,
        };
        EnableGenerator { pattern: self, cycle: 0, rng }
    }
}

/// Per-cycle clock-enable values.
#[derive(Debug, Clone)]
pub struct EnableGenerator {
    pattern: ClockEnable,
    cycle: u64,
    rng: Option<ChaCha8Rng>,
}

impl EnableGenerator {
    /// Value for the next cycle. `None` means the line is unwired.
    pub fn next_enable(&mut self) -> Option<bool> {
        let cycle = self.cycle;
        self.cycle += 1;
        match self.pattern {
            ClockEnable::Unwired => None,
            ClockEnable::EveryNth(n) => Some(cycle % u64::from(n.max(1)) == 0),
            ClockEnable::Random { percent_high, .. } => {
                let roll: u8 = self.rng.as_mut().map_or(0, |rng| rng.gen_range(0..100));
                Some(roll < percent_high)
            },
        }
    }
}
