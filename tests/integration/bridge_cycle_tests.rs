//! Integration tests for the capture → combine → relay pipeline.
//!
//! Drive full service cycles against mock links and assert on the exact
//! byte stream the collector receives.

use crate::mock_links::{test_config, CapturingSink, MockClock, MockCollector, MockSource};

use framebridge::app::events::BridgeEvent;
use framebridge::app::service::BridgeService;
use framebridge::config::{BridgeConfig, CombinePolicy};
use framebridge::error::ReassemblyError;
use framebridge::link::LinkId;

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
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn full_pipeline_delivers_combined_frame_in_bounded_chunks() {
    let mut h = Harness::new(test_config());

    // Cycle 1 brings the links up, cycle 2 moves the first frame.
    assert!(!h.cycle());
    assert!(h.cycle());

    // 2400 combined bytes through a 500-byte chunk cap: 4 full + 400 tail.
    assert_eq!(h.collector.chunks.len(), 5);
    for chunk in &h.collector.chunks[..4] {
        assert_eq!(chunk.len(), 500);
    }
    assert_eq!(h.collector.chunks[4].len(), 400);

    // First half is source A's frame, second half source B's.
    let delivered = h.collector.delivered();
    assert_eq!(delivered.len(), 2400);
    assert!(delivered[..1200].iter().all(|&x| x == 0xA1));
    assert!(delivered[1200..].iter().all(|&x| x == 0xB2));

    assert!(h.sink.events.contains(&BridgeEvent::FrameRelayed {
        bytes: 2400,
        chunks: 5,
    }));
}

#[test]
fn each_cycle_moves_an_independent_frame() {
    let mut h = Harness::new(test_config());

    h.cycle();
    for _ in 0..3 {
        assert!(h.cycle());
    }

    assert_eq!(h.svc.diagnostics().frames_relayed, 3);
    assert_eq!(h.collector.chunks.len(), 15);
    assert_eq!(h.a.frames_completed, 3);
    assert_eq!(h.b.frames_completed, 3);
}

// ── Combine policy ────────────────────────────────────────────

#[test]
fn stalled_source_skips_relay_under_require_fresh() {
    let mut h = Harness::new(test_config());
    h.cycle();
    h.b.stall = true;

    assert!(!h.cycle());
    assert!(h.collector.chunks.is_empty());
    assert!(h.sink.events.contains(&BridgeEvent::ReassemblyFailed {
        link: LinkId::SourceB,
        error: ReassemblyError::NoData { collected: 0 },
    }));
    assert!(h.sink.events.contains(&BridgeEvent::StaleFrameSkipped {
        source_a_fresh: true,
        source_b_fresh: false,
    }));

    // The stall clears; relaying resumes with no operator action.
    h.b.stall = false;
    assert!(h.cycle());
}

#[test]
fn legacy_policy_relays_the_stale_half_anyway() {
    let config = BridgeConfig {
        combine_policy: CombinePolicy::AlwaysSend,
        ..test_config()
    };
    let mut h = Harness::new(config);
    h.cycle();
    h.b.stall = true;

    assert!(h.cycle());
    let delivered = h.collector.delivered();
    assert!(delivered[..1200].iter().all(|&x| x == 0xA1));
    // Source B never produced anything; its buffer is still zeroed.
    assert!(delivered[1200..].iter().all(|&x| x == 0x00));
}

// ── Desynchronised source ─────────────────────────────────────

#[test]
fn desynchronised_source_surfaces_overflow_and_sends_nothing() {
    // 700-byte frames with 512-byte pulls: a source that ignores the
    // frame boundary overruns on its second chunk.
    let config = BridgeConfig {
        raw_frame_size: 700,
        ..test_config()
    };
    let mut h = Harness::new(config);
    h.a.ignore_frame_boundary = true;

    h.cycle();
    assert!(!h.cycle());

    assert!(h.collector.chunks.is_empty());
    assert!(h.sink.events.contains(&BridgeEvent::ReassemblyFailed {
        link: LinkId::SourceA,
        error: ReassemblyError::Overflow {
            collected: 512,
            chunk_len: 512,
            target: 700,
        },
    }));
    assert_eq!(h.svc.diagnostics().reassembly_failures, 1);
}
