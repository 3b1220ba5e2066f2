//! Unified error types for the bridge.
//!
//! One small enum per subsystem, all funnelled into a top-level [`Error`]
//! so the cycle controller's handling stays uniform. Every variant is
//! `Copy` and carries only the accounting needed to diagnose the failure.
//! No variant is fatal to the process — errors are local to one cycle and
//! one link.

use core::fmt;

use crate::link::LinkId;

// ---------------------------------------------------------------------------
// Top-level bridge error
// ---------------------------------------------------------------------------

/// Every fallible operation in the bridge funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A source frame could not be reassembled this cycle.
    Reassembly(ReassemblyError),
    /// The combined frame could not be delivered this cycle.
    Send(SendError),
    /// A liveness check failed before an operation was attempted.
    LinkDown(LinkId),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reassembly(e) => write!(f, "reassembly: {e}"),
            Self::Send(e) => write!(f, "send: {e}"),
            Self::LinkDown(link) => write!(f, "link down: {link}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Reassembly errors
// ---------------------------------------------------------------------------

/// Failure while collecting a fixed-size frame from MTU-bounded chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyError {
    /// Appending the next chunk would exceed the target frame size.
    /// Indicates protocol desynchronisation on the source side; the
    /// partial buffer is discarded, never forwarded.
    Overflow {
        collected: usize,
        chunk_len: usize,
        target: usize,
    },
    /// A single chunk pull returned zero bytes before the target was
    /// reached. Terminal for this cycle; not retried within the call.
    NoData { collected: usize },
}

impl fmt::Display for ReassemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow {
                collected,
                chunk_len,
                target,
            } => write!(
                f,
                "overflow: {collected}+{chunk_len} bytes would exceed target {target}"
            ),
            Self::NoData { collected } => {
                write!(f, "zero-length read after {collected} bytes")
            }
        }
    }
}

impl From<ReassemblyError> for Error {
    fn from(e: ReassemblyError) -> Self {
        Self::Reassembly(e)
    }
}

// ---------------------------------------------------------------------------
// Send errors
// ---------------------------------------------------------------------------

/// Failure while pushing an ack-gated chunked transfer to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// No acknowledgment arrived within the deadline for chunk `chunk_index`.
    AckTimeout { chunk_index: usize },
    /// An acknowledgment arrived for chunk `chunk_index` but did not carry
    /// the expected token.
    AckMismatch { chunk_index: usize },
    /// The underlying stream failed mid-transfer.
    Stream(StreamError),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AckTimeout { chunk_index } => {
                write!(f, "ack timeout on chunk {chunk_index}")
            }
            Self::AckMismatch { chunk_index } => {
                write!(f, "ack mismatch on chunk {chunk_index}")
            }
            Self::Stream(e) => write!(f, "stream: {e}"),
        }
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Self::Send(e)
    }
}

impl From<StreamError> for SendError {
    fn from(e: StreamError) -> Self {
        Self::Stream(e)
    }
}

// ---------------------------------------------------------------------------
// Stream transport errors
// ---------------------------------------------------------------------------

/// Errors surfaced by [`StreamPort`](crate::app::ports::StreamPort)
/// implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The stream is not connected.
    NotConnected,
    /// A write or read failed at the socket layer.
    Io,
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Bridge-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
