//! CCT light firmware: main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  NvsStore        LogReportSink   OneShotTimer      Standalone  │
//! │  (StoragePort)   (ReportSink)    (GuardTimer)      Network     │
//! │  LedcChannel ×2  ButtonDriver    StatusLed                     │
//! │  (PwmPort)                                                     │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            LightEngine (pure logic)                    │    │
//! │  │  state · photometry · anti-flash guard · presets       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  warm / cold fade workers (one thread each)                    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use cctlight::adapters::guard_timer::OneShotTimer;
use cctlight::adapters::log_sink::LogReportSink;
use cctlight::adapters::network::StandaloneNetwork;
use cctlight::adapters::nvs::NvsStore;
use cctlight::adapters::time::MonotonicClock;
use cctlight::app::input::InputHandler;
use cctlight::app::ports::NetworkPort;
use cctlight::app::presets::PresetCycler;
use cctlight::drivers::button::ButtonDriver;
use cctlight::drivers::hw_init::{self, LEDC_CH_COLD, LEDC_CH_WARM};
use cctlight::drivers::ledc::LedcChannel;
use cctlight::drivers::status_led::{StatusLed, BLINK_HALF_PERIOD};
use cctlight::output::{spawn_channel_workers, ChannelOutputs};
use cctlight::{pins, EnginePorts, Error, LightConfig, LightEngine};

/// Button sampling period.  Well under the 50 ms debounce.
const INPUT_POLL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CCT Light v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = LightConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 2. Hardware ───────────────────────────────────────────
    hw_init::init_peripherals(config.pwm_frequency_hz)?;
    let mut status = StatusLed::default();
    status.on();
    if let Err(e) = hw_init::init_isr_service() {
        warn!("ISR service init failed: {}, button disabled", e);
    }

    // ── 3. Storage ────────────────────────────────────────────
    let storage = NvsStore::new().unwrap_or_else(|e| {
        warn!("NVS init failed ({}), running without persistence", e);
        NvsStore::default()
    });

    // ── 4. Output channels ────────────────────────────────────
    let outputs = ChannelOutputs::new(config.queue_policy);
    spawn_channel_workers(
        &outputs,
        LedcChannel::new(LEDC_CH_WARM, config.max_duty),
        LedcChannel::new(LEDC_CH_COLD, config.max_duty),
        &config,
    )?;

    // ── 5. Engine ─────────────────────────────────────────────
    let engine = LightEngine::initialize(
        config,
        outputs,
        EnginePorts {
            storage: Box::new(storage),
            reports: Box::new(LogReportSink::new()),
            timer: Box::new(OneShotTimer::new()?),
        },
    );

    // ── 6. Network ────────────────────────────────────────────
    let network = StandaloneNetwork::new();
    while !network.is_connected() {
        info!("Waiting for network...");
        status.toggle();
        std::thread::sleep(BLINK_HALF_PERIOD);
    }
    // Solid LED: joined.
    status.on();
    engine.report_current_state();

    // ── 7. Input loop ─────────────────────────────────────────
    let clock = MonotonicClock::new();
    let mut button = ButtonDriver::new(pins::BUTTON_GPIO);
    let mut input = InputHandler::new(engine, PresetCycler::default(), Box::new(network));

    info!("System ready. Entering input loop.");
    loop {
        if let Some(event) = button.poll(clock.uptime_ms()) {
            input.handle(event);
        }
        std::thread::sleep(INPUT_POLL);
    }
}
