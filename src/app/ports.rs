//! Port traits — the hexagonal boundary between bridge logic and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ BridgeService (domain)
//! ```
//!
//! Driven adapters (peripheral radios, the collector socket, the clock,
//! event sinks) implement these traits. The
//! [`BridgeService`](super::service::BridgeService) consumes them via
//! generics, so the domain core never touches a socket or radio directly —
//! the whole cycle runs against mocks in tests.
//!
//! Discovery, pairing and address resolution live entirely inside
//! peripheral adapters; the domain only ever asks for reconnection and
//! chunks.

use crate::error::StreamError;

// ───────────────────────────────────────────────────────────────
// Peripheral port (driven adapter: wireless source → domain)
// ───────────────────────────────────────────────────────────────

/// One chunked notification channel on a wireless peripheral.
///
/// The transport is an opaque byte-chunk source with a known maximum
/// chunk size; the adapter owns the peer address and the identity of the
/// frame-data channel.
pub trait PeripheralPort {
    /// Attempt a transport-layer connection to the peer.
    /// Returns `true` on success.
    fn connect(&mut self) -> bool;

    /// Transport-layer liveness. Cheap; called once per cycle.
    fn is_connected(&self) -> bool;

    /// Locate the frame-data channel on a connected peer.
    /// Returns `false` when the expected channel is absent — the link is
    /// then functionally unusable (degraded) until a fresh reconnect.
    fn resolve_frame_channel(&mut self) -> bool;

    /// Pull the next chunk into `buf`, returning the number of bytes
    /// delivered. At most `buf.len()` bytes; 0 means no data / read error.
    fn pull_chunk(&mut self, buf: &mut [u8]) -> usize;
}

// ───────────────────────────────────────────────────────────────
// Stream port (driven adapter: domain → collector)
// ───────────────────────────────────────────────────────────────

/// The reliable point-to-point stream to the central collector.
pub trait StreamPort {
    /// Attempt to (re)establish the stream. Returns `true` on success.
    fn connect(&mut self) -> bool;

    /// Stream-layer liveness. Cheap; called once per cycle.
    fn is_connected(&self) -> bool;

    /// Write `data` in full. A short write is an error at this boundary.
    fn write(&mut self, data: &[u8]) -> Result<(), StreamError>;

    /// Bytes currently readable without blocking.
    fn bytes_available(&self) -> usize;

    /// Read exactly `buf.len()` bytes.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ↔ monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic time and cooperative sleep.
///
/// The only clock the domain sees. Deadline waits (the acknowledgment
/// poll in the stream sender, reconnect backoff) are expressed against
/// this trait, which makes the 10 ms poll / 10 s deadline semantics fully
/// testable with a scripted clock.
pub trait TimePort {
    /// Milliseconds since an arbitrary fixed origin, monotonic.
    fn now_ms(&self) -> u64;

    /// Yield for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → observability)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`BridgeEvent`](super::events::BridgeEvent)s
/// through this port. Adapters decide where they go — the host logger in
/// production, a recording vector in tests.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::BridgeEvent);
}
