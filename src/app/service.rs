//! The frame-cycle controller — the hexagonal core.
//!
//! [`BridgeService`] owns the three link supervisors, the frame arena,
//! the reassembler and the sender. One call to [`run_cycle`] drives one
//! full iteration of the bridge:
//!
//! ```text
//!  PeripheralPort ──▶ ┌──────────────────────────┐ ──▶ StreamPort
//!  PeripheralPort ──▶ │      BridgeService        │ ──▶ EventSink
//!        TimePort ──▶ │ supervise · reassemble ·  │
//!                     │ combine · send            │
//!                     └──────────────────────────┘
//! ```
//!
//! Per cycle: poll liveness on every link, reconnect the unusable ones,
//! reassemble from each usable source into its arena buffer, then — if
//! the combine policy allows and the collector link is usable — combine
//! and send. A cycle that fails anywhere simply proceeds to the next one;
//! there is no backlog, queueing, or replay.
//!
//! [`run_cycle`]: BridgeService::run_cycle

use log::info;

use crate::config::{BridgeConfig, CombinePolicy};
use crate::diagnostics::BridgeDiagnostics;
use crate::error::Error;
use crate::link::{EstablishOutcome, LinkId, LinkState, LinkSupervisor};
use crate::transfer::combine::combine;
use crate::transfer::reassembly::ChunkReassembler;
use crate::transfer::sender::ChunkedStreamSender;

use super::events::BridgeEvent;
use super::ports::{EventSink, PeripheralPort, StreamPort, TimePort};

// ───────────────────────────────────────────────────────────────
// Frame arena
// ───────────────────────────────────────────────────────────────

/// The three fixed-size buffers the bridge ever owns: one per source
/// plus the combined payload. Replaces the legacy firmware's global
/// statics — allocated once, overwritten in place every cycle, never
/// shared. Starts zero-filled, which is exactly what the legacy
/// `AlwaysSend` policy transmits before the first capture.
struct FrameArena {
    source_a: Box<[u8]>,
    source_b: Box<[u8]>,
    combined: Box<[u8]>,
}

impl FrameArena {
    fn new(frame_size: usize) -> Self {
        Self {
            source_a: vec![0u8; frame_size].into_boxed_slice(),
            source_b: vec![0u8; frame_size].into_boxed_slice(),
            combined: vec![0u8; frame_size * 2].into_boxed_slice(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Cycle reporter
// ───────────────────────────────────────────────────────────────

/// Bundles the event sink and diagnostics for one cycle so the helper
/// functions stay at a sane arity.
struct Reporter<'a, E: EventSink> {
    sink: &'a mut E,
    diag: &'a mut BridgeDiagnostics,
    cycle: u64,
}

impl<E: EventSink> Reporter<'_, E> {
    fn emit(&mut self, event: BridgeEvent) {
        self.sink.emit(&event);
    }

    fn failure(&mut self, error: Error) {
        self.diag.record_failure(self.cycle, error);
    }
}

// ───────────────────────────────────────────────────────────────
// BridgeService
// ───────────────────────────────────────────────────────────────

/// The bridge's cycle controller.
pub struct BridgeService {
    config: BridgeConfig,
    reassembler: ChunkReassembler,
    sender: ChunkedStreamSender,
    source_a: LinkSupervisor,
    source_b: LinkSupervisor,
    collector: LinkSupervisor,
    arena: FrameArena,
    diagnostics: BridgeDiagnostics,
    cycle: u64,
}

impl BridgeService {
    /// Construct the service from a validated configuration.
    pub fn new(config: BridgeConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self {
            reassembler: ChunkReassembler::new(config.peripheral_mtu),
            sender: ChunkedStreamSender::new(
                config.stream_chunk_size,
                config.ack_poll_interval_ms,
                config.ack_timeout_ms,
            ),
            source_a: LinkSupervisor::new(LinkId::SourceA, config.reconnect),
            source_b: LinkSupervisor::new(LinkId::SourceB, config.reconnect),
            collector: LinkSupervisor::new(LinkId::Collector, config.reconnect),
            arena: FrameArena::new(config.raw_frame_size),
            diagnostics: BridgeDiagnostics::new(),
            cycle: 0,
            config,
        })
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full cycle. Returns `true` when a combined frame was
    /// delivered and fully acknowledged.
    pub fn run_cycle(
        &mut self,
        port_a: &mut impl PeripheralPort,
        port_b: &mut impl PeripheralPort,
        stream: &mut impl StreamPort,
        clock: &mut impl TimePort,
        sink: &mut impl EventSink,
    ) -> bool {
        self.cycle += 1;
        self.diagnostics.cycles += 1;
        let mut rep = Reporter {
            sink,
            diag: &mut self.diagnostics,
            cycle: self.cycle,
        };

        // 1. Service both sources: liveness → reassemble or reconnect.
        let a_fresh = Self::service_source(
            &mut self.source_a,
            &self.reassembler,
            port_a,
            &mut self.arena.source_a,
            clock.now_ms(),
            &mut rep,
        );
        let b_fresh = Self::service_source(
            &mut self.source_b,
            &self.reassembler,
            port_b,
            &mut self.arena.source_b,
            clock.now_ms(),
            &mut rep,
        );

        // 2. Collector link maintenance runs every cycle, independent of
        //    what the sources produced.
        let before = self.collector.state();
        self.collector.observe_liveness(stream.is_connected());
        if before != self.collector.state() {
            rep.failure(Error::LinkDown(LinkId::Collector));
        }
        Self::emit_transition(&mut rep, &self.collector, before);

        let send_allowed = match self.config.combine_policy {
            CombinePolicy::RequireFresh => a_fresh && b_fresh,
            CombinePolicy::AlwaysSend => true,
        };

        // 3. Combine + send, or reconnect the stream.
        let mut relayed = false;
        if self.collector.is_usable() {
            if send_allowed {
                combine(
                    &self.arena.source_a,
                    &self.arena.source_b,
                    &mut self.arena.combined,
                );
                match self.sender.send(stream, clock, &self.arena.combined) {
                    Ok(report) => {
                        relayed = true;
                        rep.diag.frames_relayed += 1;
                        rep.emit(BridgeEvent::FrameRelayed {
                            bytes: report.bytes_sent,
                            chunks: report.chunks_sent,
                        });
                    }
                    Err(error) => {
                        rep.diag.send_failures += 1;
                        rep.failure(Error::Send(error));
                        rep.emit(BridgeEvent::SendFailed { error });
                    }
                }
            } else {
                rep.diag.stale_skips += 1;
                rep.emit(BridgeEvent::StaleFrameSkipped {
                    source_a_fresh: a_fresh,
                    source_b_fresh: b_fresh,
                });
            }
        } else {
            Self::attempt_reconnect(&mut self.collector, clock.now_ms(), &mut rep, || {
                if stream.connect() {
                    EstablishOutcome::Connected
                } else {
                    EstablishOutcome::TransportFailed
                }
            });
        }

        rep.emit(BridgeEvent::CycleCompleted {
            cycle: self.cycle,
            relayed,
        });
        relayed
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn diagnostics(&self) -> &BridgeDiagnostics {
        &self.diagnostics
    }

    pub fn link_state(&self, link: LinkId) -> LinkState {
        self.supervisor(link).state()
    }

    /// `true` only while the link is `Connected`.
    pub fn link_usable(&self, link: LinkId) -> bool {
        self.supervisor(link).is_usable()
    }

    /// Whether the link's retry budget is spent.
    pub fn link_exhausted(&self, link: LinkId) -> bool {
        self.supervisor(link).is_exhausted()
    }

    /// Re-open a spent retry budget for one link.
    pub fn reset_retry_budget(&mut self, link: LinkId) {
        info!("{link}: retry budget reset");
        self.supervisor_mut(link).reset_budget();
    }

    // ── Internal ──────────────────────────────────────────────

    fn supervisor(&self, link: LinkId) -> &LinkSupervisor {
        match link {
            LinkId::SourceA => &self.source_a,
            LinkId::SourceB => &self.source_b,
            LinkId::Collector => &self.collector,
        }
    }

    fn supervisor_mut(&mut self, link: LinkId) -> &mut LinkSupervisor {
        match link {
            LinkId::SourceA => &mut self.source_a,
            LinkId::SourceB => &mut self.source_b,
            LinkId::Collector => &mut self.collector,
        }
    }

    /// Liveness → reassemble-or-reconnect for one source. Returns whether
    /// the frame buffer was refreshed this cycle.
    fn service_source<E: EventSink>(
        sup: &mut LinkSupervisor,
        reassembler: &ChunkReassembler,
        port: &mut impl PeripheralPort,
        frame: &mut [u8],
        now_ms: u64,
        rep: &mut Reporter<'_, E>,
    ) -> bool {
        let before = sup.state();
        sup.observe_liveness(port.is_connected());
        if before != sup.state() {
            // observe_liveness only ever demotes to Disconnected.
            rep.failure(Error::LinkDown(sup.id()));
        }
        Self::emit_transition(rep, sup, before);

        if sup.is_usable() {
            match reassembler.collect(port, frame) {
                Ok(bytes) => {
                    rep.emit(BridgeEvent::FrameCaptured {
                        link: sup.id(),
                        bytes,
                    });
                    true
                }
                Err(error) => {
                    // No frame from this source this cycle. The link is
                    // not demoted here; the next cycle's liveness check
                    // decides that.
                    rep.diag.reassembly_failures += 1;
                    rep.failure(Error::Reassembly(error));
                    rep.emit(BridgeEvent::ReassemblyFailed {
                        link: sup.id(),
                        error,
                    });
                    false
                }
            }
        } else {
            Self::attempt_reconnect(sup, now_ms, rep, || {
                if !port.connect() {
                    EstablishOutcome::TransportFailed
                } else if !port.resolve_frame_channel() {
                    EstablishOutcome::SubResourceMissing
                } else {
                    EstablishOutcome::Connected
                }
            });
            false
        }
    }

    /// Run one establish attempt if the supervisor's policy allows it now.
    fn attempt_reconnect<E: EventSink>(
        sup: &mut LinkSupervisor,
        now_ms: u64,
        rep: &mut Reporter<'_, E>,
        establish: impl FnOnce() -> EstablishOutcome,
    ) {
        if !sup.reconnect_due(now_ms) {
            return;
        }
        let before = sup.state();
        let was_exhausted = sup.is_exhausted();

        sup.begin_attempt();
        let outcome = establish();
        sup.complete_attempt(outcome, now_ms);

        rep.diag.reconnect_attempts += 1;
        rep.emit(BridgeEvent::ReconnectAttempted {
            link: sup.id(),
            connected: sup.is_usable(),
        });
        Self::emit_transition(rep, sup, before);

        if sup.is_exhausted() && !was_exhausted {
            rep.emit(BridgeEvent::ReconnectExhausted { link: sup.id() });
        }
    }

    fn emit_transition<E: EventSink>(
        rep: &mut Reporter<'_, E>,
        sup: &LinkSupervisor,
        from: LinkState,
    ) {
        let to = sup.state();
        if from != to {
            rep.emit(BridgeEvent::LinkStateChanged {
                link: sup.id(),
                from,
                to,
            });
        }
    }
}
