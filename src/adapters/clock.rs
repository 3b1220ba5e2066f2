//! Monotonic clock adapter.
//!
//! [`TimePort`] over `std::time::Instant` plus a real sleeping wait.
//! Tests use scripted clocks instead; this adapter is the production
//! wiring.

use std::time::{Duration, Instant};

use crate::app::ports::TimePort;

/// Wall-independent monotonic clock.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimePort for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
