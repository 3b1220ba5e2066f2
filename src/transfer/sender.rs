//! Ack-gated chunked sending over the collector stream.
//!
//! The combined payload is segmented into bounded chunks; after each
//! write the sender blocks until the collector echoes the acknowledgment
//! token, polling availability on a fixed interval against a hard
//! deadline. At most one chunk is ever in flight — ordering is implicit,
//! so the protocol needs no sequence numbers or checksums.
//!
//! A transfer succeeds only if every chunk was acknowledged. Any timeout,
//! mismatch or stream failure aborts the remainder; the caller drops the
//! frame and starts the next cycle from a clean state (there is no
//! mid-buffer retry).

use log::{debug, warn};

use crate::app::ports::{StreamPort, TimePort};
use crate::error::SendError;

/// The marker the collector must echo after each chunk. Read back as a
/// 4-byte buffer and compared on this 3-byte prefix.
pub const ACK_TOKEN: &[u8; 3] = b"ACK";

/// How many bytes one acknowledgment occupies on the wire.
pub const ACK_READ_LEN: usize = 4;

/// Outcome accounting for one completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub bytes_sent: usize,
    pub chunks_sent: usize,
}

/// Segments payloads and gates each chunk behind an acknowledgment.
pub struct ChunkedStreamSender {
    chunk_size: usize,
    poll_interval_ms: u64,
    ack_timeout_ms: u64,
}

impl ChunkedStreamSender {
    pub fn new(chunk_size: usize, poll_interval_ms: u64, ack_timeout_ms: u64) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            poll_interval_ms: poll_interval_ms.max(1),
            ack_timeout_ms,
        }
    }

    /// Send `payload` as `ceil(len / chunk_size)` acknowledged chunks.
    ///
    /// Chunks go out in strictly increasing offset order and chunk `k+1`
    /// is never written before chunk `k`'s acknowledgment matched.
    pub fn send(
        &self,
        stream: &mut impl StreamPort,
        clock: &mut impl TimePort,
        payload: &[u8],
    ) -> Result<SendReport, SendError> {
        let mut offset = 0usize;
        let mut chunk_index = 0usize;

        while offset < payload.len() {
            let end = (offset + self.chunk_size).min(payload.len());
            stream.write(&payload[offset..end])?;
            self.await_ack(stream, clock, chunk_index)?;

            offset = end;
            chunk_index += 1;
        }

        debug!("sent {offset} bytes in {chunk_index} chunks");
        Ok(SendReport {
            bytes_sent: offset,
            chunks_sent: chunk_index,
        })
    }

    /// Block until an acknowledgment is readable and matches, or the
    /// deadline passes. A single deadline-driven wait, not a busy loop:
    /// each poll miss yields through the time port.
    fn await_ack(
        &self,
        stream: &mut impl StreamPort,
        clock: &mut impl TimePort,
        chunk_index: usize,
    ) -> Result<(), SendError> {
        let deadline = clock.now_ms() + self.ack_timeout_ms;

        while stream.bytes_available() == 0 {
            let now = clock.now_ms();
            if now >= deadline {
                warn!("no acknowledgment for chunk {chunk_index} within deadline");
                return Err(SendError::AckTimeout { chunk_index });
            }
            clock.sleep_ms(self.poll_interval_ms.min(deadline - now));
        }

        let mut ack = [0u8; ACK_READ_LEN];
        stream.read_exact(&mut ack)?;
        if &ack[..ACK_TOKEN.len()] != ACK_TOKEN {
            warn!("bad acknowledgment for chunk {chunk_index}: {ack:?}");
            return Err(SendError::AckMismatch { chunk_index });
        }
        Ok(())
    }
}
