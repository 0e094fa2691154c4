//! Integration tests for the LightEngine → duty queues pipeline.
//!
//! The engine runs against recording mocks; duty commands are read back
//! straight from the channel queues.

use std::time::Duration;

use cctlight::app::attributes::AttrValue;
use cctlight::app::commands::LightCommand;
use cctlight::app::photometry;
use cctlight::app::state::{
    LightState, StartupBehavior, DEFAULT_BRIGHTNESS, DEFAULT_TEMP, MAX_BRIGHTNESS, MAX_TEMP,
};
use cctlight::config::{LightConfig, QueuePolicy};
use cctlight::output::queue::DutyCommand;

use crate::mock_hw::{ManualTimer, MemStore, Rig};

fn expected(state: &LightState) -> (DutyCommand, DutyCommand) {
    let t = photometry::derive(state, &LightConfig::default());
    (t.warm, t.cold)
}

// ── Initialisation ────────────────────────────────────────────

#[test]
fn fresh_store_boots_off_with_defaults() {
    let rig = Rig::new(MemStore::new());
    let s = rig.state();
    assert!(!s.is_on);
    assert_eq!(s.brightness, DEFAULT_BRIGHTNESS);
    assert_eq!(s.mireds, DEFAULT_TEMP);
    assert_eq!(s.startup, StartupBehavior::Off);
    assert_eq!(s.on_transition_ms, 100);

    let sent = rig.drain();
    assert_eq!(sent, vec![(DutyCommand::new(0, 100), DutyCommand::new(0, 100))]);
    assert!(rig.store.writes().is_empty(), "Off policy must not write at boot");
}

#[test]
fn startup_on_ignores_stored_level() {
    let rig = Rig::new(MemStore::with(&[("onoff", 1), ("brightness", 10), ("state", 0)]));
    let s = rig.state();
    assert!(s.is_on);
    assert_eq!(s.brightness, DEFAULT_BRIGHTNESS);
    assert_eq!(rig.drain(), vec![expected(&s)]);
}

#[test]
fn previous_state_restores_everything() {
    let rig = Rig::new(MemStore::with(&[
        ("onoff", 255),
        ("state", 1),
        ("brightness", 200),
        ("mireds", 300),
        ("ontime", 400),
        ("offtime", 900),
    ]));
    let s = rig.state();
    assert!(s.is_on);
    assert_eq!(s.brightness, 200);
    assert_eq!(s.mireds, 300);
    assert_eq!(s.on_transition_ms, 400);
    assert_eq!(s.off_transition_ms, 900);
    assert_eq!(s.startup, StartupBehavior::PreviousState);

    let sent = rig.drain();
    assert_eq!(sent, vec![expected(&s)]);
    assert_eq!(sent[0].0.fade_ms, 400);
}

#[test]
fn stored_values_out_of_range_are_clamped() {
    let rig = Rig::new(MemStore::with(&[
        ("onoff", 255),
        ("state", 1),
        ("brightness", 4000),
        ("mireds", 9),
    ]));
    let s = rig.state();
    assert_eq!(s.brightness, MAX_BRIGHTNESS);
    assert_eq!(s.mireds, 167);
}

#[test]
fn toggle_startup_inverts_without_writing() {
    let store = MemStore::with(&[("onoff", 2), ("state", 1), ("brightness", 200), ("mireds", 300)]);
    let rig = Rig::new(store.clone());
    let s = rig.state();
    assert!(!s.is_on);
    assert_eq!(s.brightness, 200);
    assert_eq!(s.mireds, 300);
    assert!(store.writes().is_empty(), "boot only reads");

    // The first on/off change records the new value.
    rig.engine.toggle_on_off();
    assert_eq!(store.value("state"), Some(1));
}

#[test]
fn toggle_startup_comes_up_at_default_level() {
    let store = MemStore::with(&[("onoff", 2), ("state", 0), ("brightness", 200)]);
    let rig = Rig::new(store.clone());
    let s = rig.state();
    assert!(s.is_on);
    assert_eq!(s.brightness, DEFAULT_BRIGHTNESS);
    assert!(store.writes().is_empty());

    let rig = Rig::new(MemStore::with(&[("onoff", 2), ("state", 0), ("brightness", 0)]));
    assert_eq!(rig.state().brightness, DEFAULT_BRIGHTNESS);
}

#[test]
fn unknown_startup_code_falls_back_to_off() {
    let rig = Rig::new(MemStore::with(&[("onoff", 7), ("state", 1), ("brightness", 99)]));
    let s = rig.state();
    assert_eq!(s.startup, StartupBehavior::Off);
    assert!(!s.is_on);
    assert_eq!(s.brightness, DEFAULT_BRIGHTNESS);
}

#[test]
fn unreadable_store_uses_defaults() {
    let rig = Rig::new(MemStore::broken());
    let s = rig.state();
    assert_eq!(s, LightState::default());
}

// ── Setters ───────────────────────────────────────────────────

#[test]
fn repeated_setter_dispatches_and_writes_once() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 255), ("state", 1), ("brightness", 10)]));
    rig.engine.set_brightness(120);
    rig.engine.set_brightness(120);
    rig.engine.set_color_temperature(250);
    rig.engine.set_color_temperature(250);

    assert_eq!(rig.drain().len(), 2);
    assert_eq!(rig.store.writes_to("brightness"), 1);
    assert_eq!(rig.store.writes_to("mireds"), 1);
}

#[test]
fn off_policy_does_not_persist_level_but_previous_does() {
    let off = Rig::settled(MemStore::new());
    off.engine.set_brightness(120);
    off.engine.set_color_temperature(300);
    off.engine.toggle_on_off();
    assert!(off.store.writes().is_empty());

    let prev = Rig::settled(MemStore::with(&[("onoff", 255)]));
    prev.engine.set_brightness(120);
    prev.engine.set_color_temperature(300);
    prev.engine.toggle_on_off();
    assert_eq!(prev.store.value("brightness"), Some(120));
    assert_eq!(prev.store.value("mireds"), Some(300));
    assert_eq!(prev.store.value("state"), Some(1));
}

#[test]
fn out_of_range_inputs_are_clamped_before_storing() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 255)]));
    rig.engine.set_brightness(255);
    rig.engine.set_color_temperature(1000);
    let s = rig.state();
    assert_eq!(s.brightness, MAX_BRIGHTNESS);
    assert_eq!(s.mireds, MAX_TEMP);
    assert_eq!(rig.store.value("brightness"), Some(u16::from(MAX_BRIGHTNESS)));
    assert_eq!(rig.store.value("mireds"), Some(MAX_TEMP));

    // Clamped value equals current: no further dispatch.
    rig.drain();
    rig.engine.set_color_temperature(2000);
    assert!(rig.drain().is_empty());
}

#[test]
fn transition_times_always_persist_and_never_dispatch() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_on_transition_time(700);
    rig.engine.set_off_transition_time(1500);
    assert!(rig.drain().is_empty());
    assert_eq!(rig.store.value("ontime"), Some(700));
    assert_eq!(rig.store.value("offtime"), Some(1500));

    // Used by the next dispatch.
    rig.engine.toggle_on_off();
    let sent = rig.drain();
    assert_eq!(sent[0].0.fade_ms, 700);
    rig.engine.toggle_on_off();
    assert_eq!(rig.drain()[0], (DutyCommand::new(0, 1500), DutyCommand::new(0, 1500)));
}

#[test]
fn toggle_flips_and_never_arms_guard() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.toggle_on_off();
    assert!(rig.state().is_on);
    assert_eq!(rig.timer.pending(), 0);
    assert!(!rig.engine.is_dispatch_blocked());
    assert_eq!(rig.drain(), vec![expected(&rig.state())]);
}

#[test]
fn zero_brightness_while_on_is_dark() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.toggle_on_off();
    rig.drain();
    rig.engine.set_brightness(0);
    let s = rig.state();
    assert!(s.is_on);
    assert_eq!(
        rig.drain(),
        vec![(DutyCommand::new(0, s.off_transition_ms), DutyCommand::new(0, s.off_transition_ms))]
    );
}

// ── Startup policy ────────────────────────────────────────────

#[test]
fn switching_to_previous_state_persists_current_state() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_brightness(80);
    rig.engine.set_color_temperature(200);
    rig.engine.toggle_on_off();
    assert!(rig.store.writes().is_empty());

    rig.engine.set_startup_behavior(StartupBehavior::PreviousState);
    assert_eq!(rig.store.value("onoff"), Some(255));
    assert_eq!(rig.store.value("state"), Some(1));
    assert_eq!(rig.store.value("brightness"), Some(80));
    assert_eq!(rig.store.value("mireds"), Some(200));

    // Power cycle: the same state comes back.
    let again = Rig::new(rig.store.clone());
    let s = again.state();
    assert!(s.is_on);
    assert_eq!((s.brightness, s.mireds), (80, 200));
}

#[test]
fn switching_to_on_persists_only_the_policy() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_startup_behavior(StartupBehavior::On);
    assert_eq!(rig.store.writes(), vec![("onoff".to_owned(), 1)]);
}

#[test]
fn clear_persisted_writes_defaults_and_is_idempotent() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 255), ("state", 1), ("brightness", 200)]));
    let before = rig.state();
    rig.engine.clear_persisted();
    let first = rig.store.writes();
    rig.engine.clear_persisted();

    for (key, want) in [
        ("state", 0),
        ("brightness", 0),
        ("mireds", DEFAULT_TEMP),
        ("ontime", 100),
        ("offtime", 100),
        ("onoff", 0),
    ] {
        assert_eq!(rig.store.value(key), Some(want), "{key}");
    }
    assert_eq!(first.len(), 6);
    assert_eq!(rig.store.writes().len(), 12);
    assert_eq!(rig.state(), before, "live state is untouched");
}

// ── Anti-flash guard ──────────────────────────────────────────

#[test]
fn switch_on_holds_dispatch_until_window_closes() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_on_off(true);
    assert!(rig.engine.is_dispatch_blocked());
    assert_eq!(rig.timer.pending(), 1);
    assert_eq!(rig.timer.last_delay(), Some(Duration::from_millis(200)));

    // Stale colour/level arriving inside the window.
    rig.engine.set_brightness(30);
    rig.engine.set_color_temperature(180);
    rig.engine.set_brightness(200);
    rig.engine.set_color_temperature(350);
    assert!(rig.drain().is_empty());

    rig.timer.fire_all();
    assert!(!rig.engine.is_dispatch_blocked());
    let s = rig.state();
    assert_eq!((s.brightness, s.mireds), (200, 350));
    assert_eq!(rig.drain(), vec![expected(&s)]);
}

#[test]
fn rearming_ignores_the_stale_expiry() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_on_off(true);
    rig.engine.set_on_off(false);
    rig.engine.set_on_off(true);
    assert_eq!(rig.timer.pending(), 2);

    assert!(rig.timer.fire_next());
    assert!(rig.engine.is_dispatch_blocked());
    assert!(rig.drain().is_empty());

    assert!(rig.timer.fire_next());
    assert!(!rig.engine.is_dispatch_blocked());
    assert_eq!(rig.drain(), vec![expected(&rig.state())]);
}

#[test]
fn rearming_a_single_shot_timer_dispatches_once() {
    let rig = Rig::with_timer(LightConfig::default(), MemStore::new(), ManualTimer::replacing());
    rig.drain();
    rig.engine.set_on_off(true);
    rig.engine.set_on_off(false);
    rig.engine.set_on_off(true);
    rig.engine.set_brightness(180);
    assert_eq!(rig.timer.pending(), 1, "earlier expiry replaced");
    assert!(rig.drain().is_empty());

    rig.timer.fire_all();
    assert!(!rig.engine.is_dispatch_blocked());
    let s = rig.state();
    assert_eq!(s.brightness, 180);
    assert_eq!(rig.drain(), vec![expected(&s)]);
}

#[test]
fn expiry_on_the_calling_thread_does_not_deadlock() {
    let rig = Rig::with_timer(LightConfig::default(), MemStore::new(), ManualTimer::inline());
    rig.drain();
    rig.engine.set_on_off(true);
    assert!(!rig.engine.is_dispatch_blocked());
    assert_eq!(rig.drain(), vec![expected(&rig.state())]);
}

#[test]
fn switch_on_when_already_on_does_not_arm() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 1)]));
    rig.engine.set_on_off(true);
    assert_eq!(rig.timer.pending(), 0);
    assert!(rig.drain().is_empty());
}

#[test]
fn disabled_guard_dispatches_immediately() {
    let config = LightConfig {
        anti_flash_enabled: false,
        ..LightConfig::default()
    };
    let rig = Rig::with_config(config, MemStore::new());
    rig.drain();
    rig.engine.set_on_off(true);
    assert_eq!(rig.timer.pending(), 0);
    assert_eq!(rig.drain(), vec![expected(&rig.state())]);
}

#[test]
fn expiry_after_engine_drop_is_harmless() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_on_off(true);
    let timer = rig.timer.clone();
    drop(rig);
    timer.fire_all();
}

// ── Identify & reports ────────────────────────────────────────

#[test]
fn identify_pulses_then_restores() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.identify(5);
    let pulse = DutyCommand::new(1024, 200);
    let off = DutyCommand::new(0, 200);
    assert_eq!(rig.drain(), vec![(pulse, pulse), (off, off)]);

    rig.engine.identify(0);
    assert_eq!(rig.drain(), vec![expected(&rig.state())]);
}

#[test]
fn report_sends_consistent_snapshot() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.set_brightness(90);
    rig.engine.report_current_state();
    let values: Vec<AttrValue> = rig.sink.reports().iter().map(|r| r.value).collect();
    assert_eq!(
        values,
        vec![AttrValue::Bool(false), AttrValue::U8(90), AttrValue::U16(DEFAULT_TEMP)]
    );
}

#[test]
fn handle_command_routes_to_operations() {
    let rig = Rig::settled(MemStore::new());
    rig.engine.handle_command(LightCommand::Toggle);
    rig.engine.handle_command(LightCommand::SetBrightness(140));
    rig.engine.handle_command(LightCommand::SetColorTemperature(190));
    rig.engine.handle_command(LightCommand::SetOffTransitionTime(250));
    rig.engine.handle_command(LightCommand::SetStartupBehavior(StartupBehavior::Toggle));
    rig.engine.handle_command(LightCommand::ReportState);

    let s = rig.state();
    assert!(s.is_on);
    assert_eq!(s.brightness, 140);
    assert_eq!(s.mireds, 190);
    assert_eq!(s.off_transition_ms, 250);
    assert_eq!(s.startup, StartupBehavior::Toggle);
    assert_eq!(rig.sink.reports().len(), 3);

    rig.engine.handle_command(LightCommand::SetOnOff(false));
    assert!(!rig.state().is_on);
}

// ── Concurrency ───────────────────────────────────────────────

#[test]
fn concurrent_callers_leave_a_consistent_state() {
    let config = LightConfig {
        queue_policy: QueuePolicy::LatestWins,
        ..LightConfig::default()
    };
    let rig = Rig::with_config(config, MemStore::with(&[("onoff", 1)]));

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let engine = rig.engine.clone();
            std::thread::spawn(move || {
                for i in 0..50u8 {
                    engine.set_brightness(t * 50 + i);
                    engine.set_color_temperature(167 + u16::from(i));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // The last command in each queue matches the final state.
    let s = rig.state();
    assert_eq!(rig.drain(), vec![expected(&s)]);
}
