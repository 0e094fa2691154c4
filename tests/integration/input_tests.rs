//! Button gestures → input handler → engine.

use cctlight::app::input::InputHandler;
use cctlight::app::presets::PresetCycler;
use cctlight::app::state::{DEFAULT_TEMP, MAX_TEMP};
use cctlight::drivers::button::{ButtonDriver, ButtonEvent};

use crate::mock_hw::{MemStore, RecordingNetwork, Rig};

fn handler(rig: &Rig) -> (InputHandler, RecordingNetwork) {
    let network = RecordingNetwork::default();
    let input = InputHandler::new(
        rig.engine.clone(),
        PresetCycler::default(),
        Box::new(network.clone()),
    );
    (input, network)
}

/// Feed a (time, pressed) trace through the gesture machine.
fn gestures(trace: &[(u32, bool)]) -> Vec<ButtonEvent> {
    let mut button = ButtonDriver::new(9);
    trace
        .iter()
        .filter_map(|&(t, pressed)| button.tick(t, pressed))
        .collect()
}

#[test]
fn short_press_toggles_and_reports() {
    let rig = Rig::settled(MemStore::new());
    let (mut input, _) = handler(&rig);

    let events = gestures(&[(0, true), (60, true), (120, false), (500, false)]);
    assert_eq!(events, vec![ButtonEvent::ShortPress]);
    for e in events {
        input.handle(e);
    }

    assert!(rig.state().is_on);
    assert_eq!(rig.sink.reports().len(), 3);
    assert_eq!(rig.timer.pending(), 0, "toggle bypasses the guard");
}

#[test]
fn double_press_cycles_preset() {
    let rig = Rig::settled(MemStore::new());
    let (mut input, _) = handler(&rig);

    let events = gestures(&[(0, true), (60, true), (100, false), (200, true), (260, true), (300, false)]);
    assert_eq!(events, vec![ButtonEvent::DoublePress]);
    input.handle(events[0]);

    assert_eq!(rig.state().mireds, MAX_TEMP);
    assert_eq!(input.presets().cursor(), 1);
}

#[test]
fn long_press_clears_storage_and_leaves_network() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 255), ("mireds", 300)]));
    let (mut input, network) = handler(&rig);

    let events = gestures(&[(0, true), (60, true), (2500, true), (5000, true), (5200, false)]);
    assert_eq!(events, vec![ButtonEvent::LongPress]);
    input.handle(events[0]);

    assert_eq!(network.resets(), 1);
    assert_eq!(rig.store.value("onoff"), Some(0));
    assert_eq!(rig.store.value("mireds"), Some(DEFAULT_TEMP));
    assert_eq!(rig.state().mireds, 300);
}
