//! Mock link adapters for integration tests.
//!
//! Record every write and serve scripted frames/acknowledgments so tests
//! can assert on the full wire history without sockets or radios. All
//! failure knobs are plain public fields a test flips mid-scenario.

use std::collections::VecDeque;

use framebridge::app::events::BridgeEvent;
use framebridge::app::ports::{EventSink, PeripheralPort, StreamPort, TimePort};
use framebridge::config::BridgeConfig;
use framebridge::error::StreamError;

// ── Shared test geometry ──────────────────────────────────────

/// Small-frame geometry: 1200-byte frames, 512-byte peripheral pulls,
/// 500-byte outbound chunks, so a combined frame is 2400 bytes in
/// 5 chunks (4 × 500 + 400).
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        raw_frame_size: 1200,
        stream_chunk_size: 500,
        peripheral_mtu: 512,
        ack_poll_interval_ms: 5,
        ack_timeout_ms: 50,
        ..BridgeConfig::default()
    }
}

// ── MockSource ────────────────────────────────────────────────

/// Peripheral source serving constant-fill frames of a fixed size.
pub struct MockSource {
    frame_size: usize,
    pub fill: u8,
    /// Whether `connect` succeeds.
    pub reachable: bool,
    /// Whether `resolve_frame_channel` succeeds.
    pub channel_present: bool,
    pub connected: bool,
    channel_resolved: bool,
    /// Serve zero-length pulls (stalled link).
    pub stall: bool,
    /// Always fill the whole pull window, ignoring the frame boundary
    /// (a desynchronised source).
    pub ignore_frame_boundary: bool,
    served: usize,
    pub frames_completed: u32,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(fill: u8, frame_size: usize) -> Self {
        Self {
            frame_size,
            fill,
            reachable: true,
            channel_present: true,
            connected: false,
            channel_resolved: false,
            stall: false,
            ignore_frame_boundary: false,
            served: 0,
            frames_completed: 0,
        }
    }
}

impl PeripheralPort for MockSource {
    fn connect(&mut self) -> bool {
        self.connected = self.reachable;
        self.channel_resolved = false;
        self.served = 0;
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn resolve_frame_channel(&mut self) -> bool {
        self.channel_resolved = self.channel_present;
        self.channel_resolved
    }

    fn pull_chunk(&mut self, buf: &mut [u8]) -> usize {
        if self.stall || !self.connected || !self.channel_resolved {
            return 0;
        }
        let n = if self.ignore_frame_boundary {
            buf.len()
        } else {
            buf.len().min(self.frame_size - self.served)
        };
        buf[..n].fill(self.fill);
        self.served += n;
        if self.served >= self.frame_size {
            self.served = 0;
            self.frames_completed += 1;
        }
        n
    }
}

// ── MockCollector ─────────────────────────────────────────────

/// How the mock collector answers each chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Queue a well-formed acknowledgment immediately after the write.
    Immediate,
    /// Never acknowledge (forces the deadline path).
    Silent,
    /// Answer with a non-matching token.
    Garbled,
}

/// Collector endpoint that records every chunk written to it.
pub struct MockCollector {
    pub reachable: bool,
    pub connected: bool,
    pub ack_mode: AckMode,
    pub chunks: Vec<Vec<u8>>,
    inbox: VecDeque<u8>,
}

#[allow(dead_code)]
impl MockCollector {
    pub fn new() -> Self {
        Self {
            reachable: true,
            connected: false,
            ack_mode: AckMode::Immediate,
            chunks: Vec::new(),
            inbox: VecDeque::new(),
        }
    }

    /// Every byte delivered so far, in write order.
    pub fn delivered(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

impl StreamPort for MockCollector {
    fn connect(&mut self) -> bool {
        self.connected = self.reachable;
        self.inbox.clear();
        self.connected
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn write(&mut self, data: &[u8]) -> Result<(), StreamError> {
        if !self.connected {
            return Err(StreamError::NotConnected);
        }
        self.chunks.push(data.to_vec());
        match self.ack_mode {
            AckMode::Immediate => self.inbox.extend(*b"ACK\0"),
            AckMode::Silent => {}
            AckMode::Garbled => self.inbox.extend(*b"NAK\0"),
        }
        Ok(())
    }

    fn bytes_available(&self) -> usize {
        self.inbox.len()
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), StreamError> {
        if self.inbox.len() < buf.len() {
            return Err(StreamError::Io);
        }
        for slot in buf.iter_mut() {
            *slot = self.inbox.pop_front().unwrap();
        }
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Clock where time advances only through `sleep_ms` or the test itself.
pub struct MockClock {
    pub now: u64,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self { now: 0 }
    }

    pub fn advance(&mut self, ms: u64) {
        self.now += ms;
    }
}

impl TimePort for MockClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.now += ms;
    }
}

// ── CapturingSink ─────────────────────────────────────────────

/// Event sink that keeps everything for later assertions.
pub struct CapturingSink {
    pub events: Vec<BridgeEvent>,
}

#[allow(dead_code)]
impl CapturingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&BridgeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for CapturingSink {
    fn emit(&mut self, event: &BridgeEvent) {
        self.events.push(*event);
    }
}
