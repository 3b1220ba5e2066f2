//! Frame transfer core: chunk reassembly, combination, and ack-gated
//! chunked sending.
//!
//! Everything in this module is pure logic over the port traits — no
//! sockets, no radios, no real clock. The per-operation transfer state
//! (bytes moved, target, deadline) lives on the stack of one call and is
//! never shared across calls.

pub mod combine;
pub mod reassembly;
pub mod sender;
