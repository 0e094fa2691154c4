//! Network attribute writes → engine.

use cctlight::app::attributes::{attr, cluster, type_id, AttrValue, AttributeDispatcher, AttributeError};
use cctlight::app::state::StartupBehavior;
use cctlight::Error;

use crate::mock_hw::{MemStore, Rig};

fn dispatcher() -> (Rig, AttributeDispatcher) {
    let rig = Rig::settled(MemStore::new());
    let d = AttributeDispatcher::new(rig.engine.clone());
    (rig, d)
}

#[test]
fn typed_writes_reach_the_engine() {
    let (rig, d) = dispatcher();
    d.dispatch(cluster::LEVEL, attr::CURRENT_LEVEL, AttrValue::U8(180)).unwrap();
    d.dispatch(cluster::COLOR_CONTROL, attr::COLOR_TEMPERATURE, AttrValue::U16(220))
        .unwrap();
    d.dispatch(cluster::ON_OFF, attr::START_UP_ON_OFF, AttrValue::Enum8(255))
        .unwrap();

    let s = rig.state();
    assert_eq!(s.brightness, 180);
    assert_eq!(s.mireds, 220);
    assert_eq!(s.startup, StartupBehavior::PreviousState);
    assert_eq!(rig.store.value("brightness"), Some(180));
}

#[test]
fn raw_payloads_are_little_endian() {
    let (rig, d) = dispatcher();
    d.dispatch_raw(cluster::LEVEL, attr::ON_TRANSITION_TIME, type_id::U16, &[0x2c, 0x01])
        .unwrap();
    d.dispatch_raw(cluster::ON_OFF, attr::ON_OFF, type_id::BOOL, &[1])
        .unwrap();

    let s = rig.state();
    assert_eq!(s.on_transition_ms, 300);
    assert!(s.is_on);
    // Switch-on opened the guard; nothing reaches the channels yet.
    assert!(rig.drain().is_empty());
    rig.timer.fire_all();
    assert_eq!(rig.drain()[0].0.fade_ms, 300);
}

#[test]
fn rejected_writes_leave_state_untouched() {
    let (rig, d) = dispatcher();
    let before = rig.state();

    let err = d
        .dispatch(cluster::LEVEL, attr::CURRENT_LEVEL, AttrValue::U16(10))
        .unwrap_err();
    assert!(matches!(err, Error::Attribute(AttributeError::WrongType { .. })));

    let err = d
        .dispatch(cluster::ON_OFF, attr::START_UP_ON_OFF, AttrValue::Enum8(9))
        .unwrap_err();
    assert_eq!(err, Error::Attribute(AttributeError::UnknownStartupCode(9)));

    let err = d.dispatch(0x0402, 0x0000, AttrValue::U16(1)).unwrap_err();
    assert_eq!(err, Error::Attribute(AttributeError::UnknownCluster(0x0402)));

    let err = d
        .dispatch_raw(cluster::COLOR_CONTROL, attr::COLOR_TEMPERATURE, type_id::U16, &[7])
        .unwrap_err();
    assert_eq!(err, Error::Attribute(AttributeError::Truncated));

    assert_eq!(rig.state(), before);
    assert!(rig.drain().is_empty());
    assert!(rig.store.writes().is_empty());
}

#[test]
fn identify_write_pulses_the_channels() {
    let (rig, d) = dispatcher();
    d.dispatch(cluster::IDENTIFY, attr::IDENTIFY_TIME, AttrValue::U16(3)).unwrap();
    let sent = rig.drain();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0.target_duty, rig.engine.config().identify_duty);
    assert_eq!(sent[1].0.target_duty, 0);
}
