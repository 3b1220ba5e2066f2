//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering every structured bridge event
//! to the host logger. A metrics or network forwarder would implement
//! the same trait.

use log::{debug, info, warn};

use crate::app::events::BridgeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`BridgeEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &BridgeEvent) {
        match event {
            BridgeEvent::FrameCaptured { link, bytes } => {
                debug!("CAPTURE | {link} | {bytes} bytes");
            }
            BridgeEvent::ReassemblyFailed { link, error } => {
                warn!("CAPTURE | {link} | failed: {error}");
            }
            BridgeEvent::FrameRelayed { bytes, chunks } => {
                info!("RELAY   | {bytes} bytes in {chunks} acknowledged chunks");
            }
            BridgeEvent::SendFailed { error } => {
                warn!("RELAY   | failed, frame dropped: {error}");
            }
            BridgeEvent::StaleFrameSkipped {
                source_a_fresh,
                source_b_fresh,
            } => {
                warn!(
                    "RELAY   | skipped (fresh: a={source_a_fresh} b={source_b_fresh})"
                );
            }
            BridgeEvent::LinkStateChanged { link, from, to } => {
                info!("LINK    | {link} | {from:?} -> {to:?}");
            }
            BridgeEvent::ReconnectAttempted { link, connected } => {
                if *connected {
                    info!("LINK    | {link} | reconnected");
                } else {
                    warn!("LINK    | {link} | reconnect failed");
                }
            }
            BridgeEvent::ReconnectExhausted { link } => {
                warn!("LINK    | {link} | retry budget spent");
            }
            BridgeEvent::CycleCompleted { cycle, relayed } => {
                debug!("CYCLE   | {cycle} | relayed={relayed}");
            }
        }
    }
}
