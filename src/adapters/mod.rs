//! Driven adapters — implementations of the port traits for the host.
//!
//! The collector stream rides a real TCP socket; the peripherals ship as
//! a scripted simulation (the radio stack, discovery and pairing live in
//! an external collaborator and are exercised here through the same
//! `PeripheralPort` seam it would use).

pub mod clock;
pub mod log_sink;
pub mod sim_peripheral;
pub mod tcp_stream;
