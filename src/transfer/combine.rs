//! Frame combination: ordered concatenation of the two source frames.
//!
//! Downstream decoding is positional — the first half of the combined
//! payload is always source A, the second half always source B — so the
//! order here is fixed and must never vary between cycles.

/// Concatenate `a` then `b` into `out`.
///
/// Pure: same inputs produce identical output, no side effects beyond
/// writing `out`. Both inputs must be the same length and `out` must hold
/// exactly both; the cycle controller owns all three buffers and sizes
/// them from one config, so a mismatch is a wiring bug.
pub fn combine(a: &[u8], b: &[u8], out: &mut [u8]) {
    assert_eq!(a.len(), b.len(), "source frames must be the same size");
    assert_eq!(out.len(), a.len() + b.len(), "combined buffer sized wrong");

    out[..a.len()].copy_from_slice(a);
    out[a.len()..].copy_from_slice(b);
}
