//! Outbound bridge events.
//!
//! The [`BridgeService`](super::service::BridgeService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — render to the logger,
//! record in a test, forward to a metrics pipeline.

use crate::error::{ReassemblyError, SendError};
use crate::link::{LinkId, LinkState};

/// Structured events emitted by the bridge core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeEvent {
    /// A source frame was fully reassembled this cycle.
    FrameCaptured { link: LinkId, bytes: usize },

    /// Reassembly from a source failed; no frame from it this cycle.
    ReassemblyFailed {
        link: LinkId,
        error: ReassemblyError,
    },

    /// The combined frame was delivered, every chunk acknowledged.
    FrameRelayed { bytes: usize, chunks: usize },

    /// Delivery failed part-way; the whole frame was dropped.
    SendFailed { error: SendError },

    /// The combine policy refused to send because at least one source
    /// buffer was not refreshed this cycle.
    StaleFrameSkipped {
        source_a_fresh: bool,
        source_b_fresh: bool,
    },

    /// A link supervisor changed state.
    LinkStateChanged {
        link: LinkId,
        from: LinkState,
        to: LinkState,
    },

    /// A reconnect attempt finished.
    ReconnectAttempted { link: LinkId, connected: bool },

    /// The link's retry budget is spent; no further attempts until reset.
    ReconnectExhausted { link: LinkId },

    /// One full cycle finished.
    CycleCompleted { cycle: u64, relayed: bool },
}
