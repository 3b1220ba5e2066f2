//! Application core: ports, events, and the frame-cycle service.

pub mod events;
pub mod ports;
pub mod service;
