//! Per-link connection supervision.
//!
//! Every link the bridge depends on — two peripheral sources and the
//! collector stream — gets its own [`LinkSupervisor`]: an explicit
//! four-state machine replacing the scattered connection booleans of the
//! legacy firmware.
//!
//! ```text
//!                 ┌─────────────┐  establish ok   ┌───────────┐
//!     retry due   │ Connecting  │ ───────────────▶│ Connected │
//!   ┌────────────▶│             │                 └─────┬─────┘
//!   │             └──────┬──────┘  channel missing      │ liveness
//!   │   transport failed │        ┌───────────┐         │ lost
//! ┌─┴────────────┐◀──────┴───────▶│ Degraded  │         │
//! │ Disconnected │◀───────────────┴───────────┴◀────────┘
//! └──────────────┘        liveness lost
//! ```
//!
//! `Degraded` means the transport is up but the expected frame-data
//! channel was not found; the link is functionally unusable and only a
//! fresh reconnect attempt (which re-resolves the channel) can recover it.
//!
//! The supervisor is a pure state machine: the cycle controller feeds it
//! liveness observations and attempt outcomes, and asks it when a retry
//! is due. All retries happen between cycles, never inside a transfer.

use log::{info, warn};

use crate::config::ReconnectPolicy;

// ---------------------------------------------------------------------------
// Link identity
// ---------------------------------------------------------------------------

/// Which of the bridge's three links a state or event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkId {
    /// First peripheral source (first half of the combined frame).
    SourceA,
    /// Second peripheral source (second half of the combined frame).
    SourceB,
    /// Outbound stream to the collector.
    Collector,
}

impl core::fmt::Display for LinkId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::SourceA => write!(f, "source-a"),
            Self::SourceB => write!(f, "source-b"),
            Self::Collector => write!(f, "collector"),
        }
    }
}

// ---------------------------------------------------------------------------
// Link state
// ---------------------------------------------------------------------------

/// Connection state of a single link. Transitions are driven only by the
/// owning [`LinkSupervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No transport connection. The initial state.
    Disconnected,
    /// An establish attempt is in flight.
    Connecting,
    /// Transport up and (for peripheral links) frame channel resolved.
    Connected,
    /// Transport up but the required frame channel is missing.
    Degraded,
}

/// Result of one establish attempt, reported by the cycle controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstablishOutcome {
    /// Transport connected and every required sub-resource resolved.
    Connected,
    /// The transport-layer connection itself failed.
    TransportFailed,
    /// Transport connected but the frame-data channel was not found.
    SubResourceMissing,
}

// ---------------------------------------------------------------------------
// Supervisor
// ---------------------------------------------------------------------------

/// State machine supervising one link's connect/reconnect lifecycle.
pub struct LinkSupervisor {
    id: LinkId,
    state: LinkState,
    policy: ReconnectPolicy,
    /// Consecutive failed attempts since the link was last usable.
    failed_attempts: u32,
    /// Earliest time the next attempt may start (backoff gate).
    next_retry_at_ms: u64,
    /// Set when the attempt budget is spent; sticky until a manual reset.
    exhausted: bool,
}

impl LinkSupervisor {
    pub fn new(id: LinkId, policy: ReconnectPolicy) -> Self {
        Self {
            id,
            state: LinkState::Disconnected,
            policy,
            failed_attempts: 0,
            next_retry_at_ms: 0,
            exhausted: false,
        }
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    /// True only in `Connected` — never in `Degraded` or `Disconnected`.
    pub fn is_usable(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Whether the retry budget is spent.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Fold a transport liveness observation into the state machine.
    /// Called at the start of every cycle, before any data movement.
    pub fn observe_liveness(&mut self, alive: bool) {
        if !alive && matches!(self.state, LinkState::Connected | LinkState::Degraded) {
            warn!("{}: liveness lost, marking disconnected", self.id);
            self.set_state(LinkState::Disconnected);
        }
    }

    /// Whether an establish attempt should run now. False while usable,
    /// while the backoff gate is closed, or once the budget is spent.
    pub fn reconnect_due(&self, now_ms: u64) -> bool {
        !self.is_usable() && !self.exhausted && now_ms >= self.next_retry_at_ms
    }

    /// Mark an establish attempt as started.
    pub fn begin_attempt(&mut self) {
        info!(
            "{}: reconnect attempt {} starting",
            self.id,
            self.failed_attempts + 1
        );
        self.set_state(LinkState::Connecting);
    }

    /// Fold the outcome of an establish attempt into the state machine.
    pub fn complete_attempt(&mut self, outcome: EstablishOutcome, now_ms: u64) {
        match outcome {
            EstablishOutcome::Connected => {
                self.failed_attempts = 0;
                self.next_retry_at_ms = 0;
                self.set_state(LinkState::Connected);
            }
            EstablishOutcome::TransportFailed => {
                self.record_failure(now_ms);
                self.set_state(LinkState::Disconnected);
            }
            EstablishOutcome::SubResourceMissing => {
                // Transport is up but the link carries nothing useful.
                self.record_failure(now_ms);
                self.set_state(LinkState::Degraded);
            }
        }
    }

    /// Re-open a spent retry budget (operator intervention).
    pub fn reset_budget(&mut self) {
        self.failed_attempts = 0;
        self.next_retry_at_ms = 0;
        self.exhausted = false;
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn record_failure(&mut self, now_ms: u64) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);

        if let Some(budget) = self.policy.max_attempts {
            if self.failed_attempts >= budget {
                warn!(
                    "{}: retry budget spent after {} attempts",
                    self.id, self.failed_attempts
                );
                self.exhausted = true;
                return;
            }
        }

        self.next_retry_at_ms = now_ms + self.backoff_ms();
    }

    /// Doubling curve: `initial * 2^(failures-1)`, capped at `max`.
    /// An initial delay of 0 keeps the legacy behavior of immediate
    /// unbounded retry.
    fn backoff_ms(&self) -> u64 {
        if self.policy.initial_backoff_ms == 0 {
            return 0;
        }
        let doublings = self.failed_attempts.saturating_sub(1).min(32);
        let raw = self
            .policy
            .initial_backoff_ms
            .saturating_mul(1u64 << doublings);
        raw.min(self.policy.max_backoff_ms.max(self.policy.initial_backoff_ms))
    }

    fn set_state(&mut self, next: LinkState) {
        if next != self.state {
            info!("{}: {:?} -> {:?}", self.id, self.state, next);
            self.state = next;
        }
    }
}
