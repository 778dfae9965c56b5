//! Per-entity tick countdowns
//!
//! Every cosmetic and lifecycle timer in the stage is one of these, decremented
//! from the owning entity's `update`.

use serde::{Deserialize, Serialize};

/// A countdown measured in simulation ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    /// An already elapsed countdown
    pub const IDLE: Countdown = Countdown { remaining: 0 };

    pub fn new(ticks: u32) -> Self {
        Self { remaining: ticks }
    }

    /// Restart with a new duration
    pub fn arm(&mut self, ticks: u32) {
        self.remaining = ticks;
    }

    /// Advance one tick. Returns true exactly on the tick the countdown reaches zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.remaining > 0
    }

    /// Fraction elapsed relative to `total` (1.0 when idle)
    pub fn progress(&self, total: u32) -> f32 {
        if total == 0 {
            return 1.0;
        }
        1.0 - self.remaining.min(total) as f32 / total as f32
    }
}
