//! Runtime diagnostics for the relay loop.
//!
//! Counters for the outcomes that matter operationally, plus a
//! fixed-capacity ring of the most recent failures. Nothing here is
//! persisted — the bridge carries no state across restarts — but the
//! service exposes the snapshot for logging and inspection.

use crate::error::Error;

/// How many recent failures the ring retains.
pub const FAILURE_RING_SLOTS: usize = 8;

/// A failure with the cycle it happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureRecord {
    pub cycle: u64,
    pub error: Error,
}

/// Aggregate counters plus a ring of recent failures.
#[derive(Default)]
pub struct BridgeDiagnostics {
    pub cycles: u64,
    pub frames_relayed: u64,
    pub reassembly_failures: u64,
    pub send_failures: u64,
    pub reconnect_attempts: u64,
    pub stale_skips: u64,
    recent: heapless::Deque<FailureRecord, FAILURE_RING_SLOTS>,
}

impl BridgeDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the failure ring, evicting the oldest entry when full.
    pub fn record_failure(&mut self, cycle: u64, error: Error) {
        if self.recent.is_full() {
            let _ = self.recent.pop_front();
        }
        // Cannot fail: a slot was just freed if needed.
        let _ = self.recent.push_back(FailureRecord { cycle, error });
    }

    /// Most recent failures, oldest first.
    pub fn recent_failures(&self) -> impl Iterator<Item = &FailureRecord> {
        self.recent.iter()
    }
}
