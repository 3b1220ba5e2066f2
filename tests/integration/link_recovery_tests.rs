//! Integration tests for link failure handling and recovery.
//!
//! Acknowledgment failures, link flaps, degraded channels, and the retry
//! budget/backoff machinery, all driven through full service cycles.

use crate::mock_links::{test_config, AckMode, CapturingSink, MockClock, MockCollector, MockSource};

use framebridge::app::events::BridgeEvent;
use framebridge::app::service::BridgeService;
use framebridge::config::{BridgeConfig, ReconnectPolicy};
use framebridge::error::{Error, SendError};
use framebridge::link::{LinkId, LinkState};

struct Harness {
    svc: BridgeService,
    a: MockSource,
    b: MockSource,
    collector: MockCollector,
    clock: MockClock,
    sink: CapturingSink,
}

impl Harness {
    fn new(config: BridgeConfig) -> Self {
        let frame = config.raw_frame_size;
        Self {
            svc: BridgeService::new(config).unwrap(),
            a: MockSource::new(0xA1, frame),
            b: MockSource::new(0xB2, frame),
            collector: MockCollector::new(),
            clock: MockClock::new(),
            sink: CapturingSink::new(),
        }
    }

    fn cycle(&mut self) -> bool {
        self.svc.run_cycle(
            &mut self.a,
            &mut self.b,
            &mut self.collector,
            &mut self.clock,
            &mut self.sink,
        )
    }

    fn attempts_on(&self, link: LinkId) -> usize {
        self.sink
            .count(|e| matches!(e, BridgeEvent::ReconnectAttempted { link: l, .. } if *l == link))
    }
}

// ── Acknowledgment failures ───────────────────────────────────

#[test]
fn silent_collector_aborts_after_first_chunk_and_recovers() {
    let mut h = Harness::new(test_config());
    h.cycle();
    h.collector.ack_mode = AckMode::Silent;

    let before = h.clock.now;
    assert!(!h.cycle());

    // One chunk went out, the rest of the frame was dropped, and the
    // full 50 ms deadline elapsed in poll steps.
    assert_eq!(h.collector.chunks.len(), 1);
    assert!(h.clock.now >= before + 50);
    assert!(h.sink.events.contains(&BridgeEvent::SendFailed {
        error: SendError::AckTimeout { chunk_index: 0 },
    }));

    // The collector comes back; the next frame goes through whole.
    h.collector.ack_mode = AckMode::Immediate;
    assert!(h.cycle());
    assert_eq!(h.collector.chunks.len(), 1 + 5);
    assert_eq!(h.svc.diagnostics().send_failures, 1);
}

#[test]
fn garbled_ack_aborts_the_transfer() {
    let mut h = Harness::new(test_config());
    h.cycle();
    h.collector.ack_mode = AckMode::Garbled;

    assert!(!h.cycle());
    assert_eq!(h.collector.chunks.len(), 1);
    assert!(h.sink.events.contains(&BridgeEvent::SendFailed {
        error: SendError::AckMismatch { chunk_index: 0 },
    }));
}

// ── Link flaps ────────────────────────────────────────────────

#[test]
fn collector_outage_reconnects_then_resumes() {
    let mut h = Harness::new(test_config());
    h.cycle();
    assert!(h.cycle());

    // The stream drops and stays unreachable for a while.
    h.collector.connected = false;
    h.collector.reachable = false;
    h.cycle();
    h.cycle();
    assert_eq!(h.svc.link_state(LinkId::Collector), LinkState::Disconnected);
    assert!(h.attempts_on(LinkId::Collector) >= 2);
    assert!(h
        .svc
        .diagnostics()
        .recent_failures()
        .any(|r| r.error == Error::LinkDown(LinkId::Collector)));

    // Endpoint returns: one cycle reconnects, the next relays.
    h.collector.reachable = true;
    h.cycle();
    assert!(h.svc.link_usable(LinkId::Collector));
    assert!(h.cycle());
}

#[test]
fn source_flap_never_relays_a_stale_buffer() {
    let mut h = Harness::new(test_config());
    h.cycle();
    assert!(h.cycle());
    let delivered_before = h.collector.chunks.len();

    // Source A drops. The same cycle reconnects it, but its buffer is
    // not fresh, so nothing is relayed.
    h.a.connected = false;
    assert!(!h.cycle());
    assert_eq!(h.collector.chunks.len(), delivered_before);
    assert!(h.sink.events.contains(&BridgeEvent::StaleFrameSkipped {
        source_a_fresh: false,
        source_b_fresh: true,
    }));

    // Fully recovered one cycle later.
    assert!(h.cycle());
}

#[test]
fn missing_frame_channel_parks_the_link_in_degraded() {
    let mut h = Harness::new(test_config());
    h.a.channel_present = false;

    h.cycle();
    assert_eq!(h.svc.link_state(LinkId::SourceA), LinkState::Degraded);
    assert!(!h.svc.link_usable(LinkId::SourceA));
    assert!(h.collector.chunks.is_empty());

    // The channel shows up; a fresh attempt promotes the link.
    h.a.channel_present = true;
    h.cycle();
    assert_eq!(h.svc.link_state(LinkId::SourceA), LinkState::Connected);
    assert!(h.cycle());
}

// ── Retry budget and backoff ──────────────────────────────────

#[test]
fn backoff_spaces_attempts_and_budget_exhaustion_is_sticky() {
    let config = BridgeConfig {
        reconnect: ReconnectPolicy {
            max_attempts: Some(3),
            initial_backoff_ms: 100,
            max_backoff_ms: 200,
        },
        ..test_config()
    };
    let mut h = Harness::new(config);
    h.a.reachable = false;

    // Attempt 1 fails at t=0; the gate holds further attempts until
    // t=100 no matter how many cycles run.
    h.cycle();
    h.cycle();
    h.cycle();
    assert_eq!(h.attempts_on(LinkId::SourceA), 1);

    h.clock.advance(100);
    h.cycle();
    assert_eq!(h.attempts_on(LinkId::SourceA), 2);

    // Attempt 3 spends the budget; nothing runs after that.
    h.clock.advance(200);
    h.cycle();
    h.clock.advance(10_000);
    h.cycle();
    h.cycle();
    assert_eq!(h.attempts_on(LinkId::SourceA), 3);
    assert!(h
        .sink
        .events
        .contains(&BridgeEvent::ReconnectExhausted { link: LinkId::SourceA }));

    // Operator resets the budget once the source is back.
    h.a.reachable = true;
    h.svc.reset_retry_budget(LinkId::SourceA);
    h.cycle();
    assert!(h.svc.link_usable(LinkId::SourceA));
}

#[test]
fn healthy_links_are_untouched_by_another_links_budget() {
    let config = BridgeConfig {
        reconnect: ReconnectPolicy {
            max_attempts: Some(1),
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        },
        ..test_config()
    };
    let mut h = Harness::new(config);
    h.b.reachable = false;

    h.cycle();
    h.cycle();
    assert!(h.svc.link_exhausted(LinkId::SourceB));
    assert!(h.svc.link_usable(LinkId::SourceA));
    assert!(h.svc.link_usable(LinkId::Collector));
}
