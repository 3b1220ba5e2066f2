//! FrameBridge — Main Entry Point
//!
//! Hexagonal architecture with a fixed capture→combine→relay cycle.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimPeripheral ×2   TcpStreamAdapter   MonotonicClock          │
//! │  (PeripheralPort)   (StreamPort)       (TimePort)              │
//! │  LogEventSink                                                  │
//! │  (EventSink)                                                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             BridgeService (pure logic)                 │    │
//! │  │  LinkSupervisor ×3 · ChunkReassembler ·                │    │
//! │  │  combine · ChunkedStreamSender                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use framebridge::adapters::clock::MonotonicClock;
use framebridge::adapters::log_sink::LogEventSink;
use framebridge::adapters::sim_peripheral::SimPeripheral;
use framebridge::adapters::tcp_stream::TcpStreamAdapter;
use framebridge::app::ports::TimePort;
use framebridge::app::service::BridgeService;
use framebridge::config::BridgeConfig;

/// Collector endpoint, overridable via `FRAMEBRIDGE_COLLECTOR`.
const DEFAULT_COLLECTOR: &str = "192.168.1.100:8123";

fn collector_endpoint() -> Result<(String, u16)> {
    let raw = std::env::var("FRAMEBRIDGE_COLLECTOR").unwrap_or_else(|_| DEFAULT_COLLECTOR.into());
    let (host, port) = raw
        .rsplit_once(':')
        .with_context(|| format!("collector endpoint '{raw}' is not host:port"))?;
    let port: u16 = port
        .parse()
        .with_context(|| format!("collector port '{port}' is not a number"))?;
    Ok((host.to_string(), port))
}

/// Load overrides from the JSON file named by `FRAMEBRIDGE_CONFIG`, or
/// fall back to the built-in defaults.
fn load_config() -> Result<BridgeConfig> {
    let config = match std::env::var("FRAMEBRIDGE_CONFIG") {
        Ok(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config file {path}"))?
        }
        Err(_) => BridgeConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("FrameBridge v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;
    let (host, port) = collector_endpoint()?;
    info!(
        "frame geometry: {} B/source, {} B combined, {} B stream chunks",
        config.raw_frame_size,
        config.combined_size(),
        config.stream_chunk_size
    );
    info!("collector endpoint: {host}:{port}");

    let pacing = config.cycle_pacing_ms;
    let frame_size = config.raw_frame_size;
    let mut service = BridgeService::new(config)?;

    // ── Wiring ────────────────────────────────────────────────
    let mut source_a = SimPeripheral::new("source-a", frame_size);
    let mut source_b = SimPeripheral::new("source-b", frame_size);
    let mut collector = TcpStreamAdapter::new(host, port);
    let mut clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();

    // ── Cycle loop ────────────────────────────────────────────
    //
    // Mirrors the firmware superloop: one cycle per iteration, every
    // failure handled inside the cycle, nothing ever propagates out.
    loop {
        service.run_cycle(
            &mut source_a,
            &mut source_b,
            &mut collector,
            &mut clock,
            &mut sink,
        );
        if pacing > 0 {
            clock.sleep_ms(pacing);
        }
    }
}
