//! FrameBridge library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. Everything here runs on the host; the only OS surface is
//! the TCP stream adapter.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod link;
pub mod transfer;

pub mod error;

pub mod adapters;
