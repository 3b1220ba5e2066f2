//! Simulated wireless peripheral.
//!
//! Serves synthetic frames through the [`PeripheralPort`] seam so the
//! full relay loop runs on a host with no radio hardware. Each simulated
//! frame is filled with a counter byte, which makes delivery order
//! visible at the collector. Optional knobs inject the failure modes the
//! bridge has to survive: dropping the link every N frames and hiding
//! the frame channel after a reconnect.

use log::info;

use crate::app::ports::PeripheralPort;

/// Scripted in-memory peripheral source.
pub struct SimPeripheral {
    name: &'static str,
    frame_size: usize,
    /// Bytes still to serve for the frame in progress.
    remaining: usize,
    frames_served: u64,
    connected: bool,
    channel_resolved: bool,
    /// Drop the link after every N completed frames (`None` = stable).
    drop_every: Option<u64>,
    /// Pretend the frame channel is missing on the next resolve.
    hide_channel_once: bool,
}

impl SimPeripheral {
    pub fn new(name: &'static str, frame_size: usize) -> Self {
        Self {
            name,
            frame_size,
            remaining: frame_size,
            frames_served: 0,
            connected: false,
            channel_resolved: false,
            drop_every: None,
            hide_channel_once: false,
        }
    }

    /// Drop the link after every `n` completed frames.
    pub fn with_drop_every(mut self, n: u64) -> Self {
        self.drop_every = Some(n);
        self
    }

    /// Make the next channel resolution fail (degraded-link path).
    pub fn hide_channel_once(&mut self) {
        self.hide_channel_once = true;
    }

    pub fn frames_served(&self) -> u64 {
        self.frames_served
    }

    fn pattern_byte(&self) -> u8 {
        (self.frames_served % 251) as u8
    }
}

impl PeripheralPort for SimPeripheral {
    fn connect(&mut self) -> bool {
        self.connected = true;
        self.channel_resolved = false;
        self.remaining = self.frame_size;
        info!("{}: (sim) connected", self.name);
        true
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn resolve_frame_channel(&mut self) -> bool {
        if self.hide_channel_once {
            self.hide_channel_once = false;
            info!("{}: (sim) frame channel missing", self.name);
            return false;
        }
        self.channel_resolved = true;
        true
    }

    fn pull_chunk(&mut self, buf: &mut [u8]) -> usize {
        if !self.connected || !self.channel_resolved || buf.is_empty() {
            return 0;
        }

        let n = buf.len().min(self.remaining);
        buf[..n].fill(self.pattern_byte());
        self.remaining -= n;

        if self.remaining == 0 {
            self.frames_served += 1;
            self.remaining = self.frame_size;
            if let Some(every) = self.drop_every {
                if self.frames_served % every == 0 {
                    info!("{}: (sim) dropping link", self.name);
                    self.connected = false;
                }
            }
        }
        n
    }
}
