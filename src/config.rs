//! Bridge configuration parameters.
//!
//! All tunable parameters for the relay bridge. There is no persisted
//! configuration surface — a [`BridgeConfig`] is built at wiring time and
//! handed to the service by value. Defaults reproduce the fielded
//! deployment: two QVGA sources (230 400 bytes per frame), a 512-byte
//! peripheral MTU, and 64 KiB outbound chunks.

use serde::{Deserialize, Serialize};

/// Hard upper bound on a single peripheral chunk. Pull buffers are sized
/// to this at compile time; `peripheral_mtu` may be configured lower but
/// never higher.
pub const MAX_PERIPHERAL_CHUNK: usize = 512;

/// Core bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    // --- Frame geometry ---
    /// Bytes per source frame. Both sources deliver exactly this much.
    pub raw_frame_size: usize,
    /// Maximum bytes per outbound stream chunk (single-write cap).
    pub stream_chunk_size: usize,
    /// Maximum bytes per inbound peripheral chunk (link MTU).
    pub peripheral_mtu: usize,

    // --- Acknowledgment protocol ---
    /// Poll interval while waiting for a chunk acknowledgment (milliseconds).
    pub ack_poll_interval_ms: u64,
    /// Total deadline for a chunk acknowledgment (milliseconds).
    pub ack_timeout_ms: u64,

    // --- Cycle policy ---
    /// What to do when only one source produced a fresh frame this cycle.
    pub combine_policy: CombinePolicy,
    /// Optional delay between cycles (milliseconds, 0 = free-running).
    pub cycle_pacing_ms: u64,

    // --- Reconnection ---
    /// Retry policy applied by every link supervisor.
    pub reconnect: ReconnectPolicy,
}

/// Policy for the open question of stale source buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinePolicy {
    /// Combine and send only when both sources refreshed their buffers
    /// this cycle. The corrected default.
    RequireFresh,
    /// Combine and send whatever the buffers currently hold, including
    /// stale data from a prior cycle. Reproduces the legacy firmware;
    /// kept for compatibility only.
    AlwaysSend,
}

/// Reconnection policy for a single link.
///
/// The default preserves the legacy behavior: unbounded attempts with
/// no delay between them. Deployments that need to bound radio churn can
/// set a budget and a doubling backoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconnectPolicy {
    /// Give up after this many consecutive failed attempts (`None` = never).
    pub max_attempts: Option<u32>,
    /// Delay before the first retry (milliseconds, 0 = immediate).
    pub initial_backoff_ms: u64,
    /// Cap for the doubling backoff curve (milliseconds).
    pub max_backoff_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            // Geometry: 320x240 raw frames, 64 KiB TCP writes, BLE MTU.
            raw_frame_size: 230_400,
            stream_chunk_size: 65_535,
            peripheral_mtu: MAX_PERIPHERAL_CHUNK,

            // Ack protocol: 10 ms poll, 10 s deadline.
            ack_poll_interval_ms: 10,
            ack_timeout_ms: 10_000,

            combine_policy: CombinePolicy::RequireFresh,
            cycle_pacing_ms: 0,

            reconnect: ReconnectPolicy::default(),
        }
    }
}

impl BridgeConfig {
    /// Length of the combined payload handed to the stream sender.
    pub fn combined_size(&self) -> usize {
        self.raw_frame_size * 2
    }

    /// Reject degenerate geometry and timing before the service starts.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.raw_frame_size == 0 {
            return Err(Error::Config("raw_frame_size must be nonzero"));
        }
        if self.stream_chunk_size == 0 {
            return Err(Error::Config("stream_chunk_size must be nonzero"));
        }
        if self.peripheral_mtu == 0 || self.peripheral_mtu > MAX_PERIPHERAL_CHUNK {
            return Err(Error::Config("peripheral_mtu out of range"));
        }
        if self.ack_timeout_ms == 0 {
            return Err(Error::Config("ack_timeout_ms must be nonzero"));
        }
        if self.ack_poll_interval_ms == 0 || self.ack_poll_interval_ms > self.ack_timeout_ms {
            return Err(Error::Config("ack_poll_interval_ms out of range"));
        }
        if self.reconnect.initial_backoff_ms > self.reconnect.max_backoff_ms
            && self.reconnect.max_backoff_ms != 0
        {
            return Err(Error::Config("initial backoff exceeds max backoff"));
        }
        Ok(())
    }
}
