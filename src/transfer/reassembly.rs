//! Chunk reassembly: collect a fixed-size frame from MTU-bounded chunks.
//!
//! One peripheral source delivers a frame as a sequence of small chunks
//! over a constrained-MTU link. The reassembler appends them in arrival
//! order into a caller-owned buffer of exactly the frame size, stopping
//! when the buffer is full.
//!
//! Failure modes:
//! - a chunk that would overrun the buffer means the source is
//!   desynchronised — the partial data is discarded, never forwarded;
//! - a zero-length pull before completion is terminal for this cycle.
//!
//! There is deliberately no timeout on the pull loop: a stalled source
//! fails fast through the zero-read path, while a source trickling valid
//! chunks slowly blocks the cycle (accepted boundary condition). Retries
//! belong to the link supervisor between cycles, never inside one call.

use log::debug;

use crate::app::ports::PeripheralPort;
use crate::config::MAX_PERIPHERAL_CHUNK;
use crate::error::ReassemblyError;

/// Collects fixed-size frames from one peripheral channel.
pub struct ChunkReassembler {
    /// Pull window per chunk. Never larger than [`MAX_PERIPHERAL_CHUNK`].
    mtu: usize,
}

impl ChunkReassembler {
    pub fn new(mtu: usize) -> Self {
        Self {
            mtu: mtu.clamp(1, MAX_PERIPHERAL_CHUNK),
        }
    }

    /// Pull chunks from `source` until `frame` is exactly full.
    ///
    /// On success every byte of `frame` was freshly written this call and
    /// the total equals `frame.len()`. On failure `frame` holds partial
    /// data that the caller must treat as garbage (the cycle controller
    /// clears the freshness flag and never forwards it).
    pub fn collect(
        &self,
        source: &mut impl PeripheralPort,
        frame: &mut [u8],
    ) -> Result<usize, ReassemblyError> {
        let target = frame.len();
        let mut chunk = [0u8; MAX_PERIPHERAL_CHUNK];
        let mut collected = 0usize;

        while collected < target {
            // Full-MTU window on purpose: pulling only the remainder would
            // mask a desynchronised source instead of surfacing Overflow.
            let n = source.pull_chunk(&mut chunk[..self.mtu]);

            if n == 0 {
                return Err(ReassemblyError::NoData { collected });
            }
            if collected + n > target {
                return Err(ReassemblyError::Overflow {
                    collected,
                    chunk_len: n,
                    target,
                });
            }

            frame[collected..collected + n].copy_from_slice(&chunk[..n]);
            collected += n;
        }

        debug!("reassembled {collected} byte frame");
        Ok(collected)
    }
}
