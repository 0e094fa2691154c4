//! Engine dispatch → channel workers → PWM.

use std::sync::Arc;

use cctlight::app::photometry;
use cctlight::output::worker::ChannelFadeWorker;
use cctlight::output::Channel;

use crate::mock_hw::{MemStore, PwmCall, RecordingPwm, Rig};

fn workers(rig: &Rig) -> (ChannelFadeWorker<RecordingPwm>, ChannelFadeWorker<RecordingPwm>) {
    let max_fade = rig.engine.config().max_fade_ms;
    (
        ChannelFadeWorker::new(
            RecordingPwm::default(),
            Arc::clone(rig.outputs.queue(Channel::Warm)),
            max_fade,
        ),
        ChannelFadeWorker::new(
            RecordingPwm::default(),
            Arc::clone(rig.outputs.queue(Channel::Cold)),
            max_fade,
        ),
    )
}

fn run_pending(worker: &mut ChannelFadeWorker<RecordingPwm>) -> usize {
    let mut n = 0;
    while worker.poll_once() {
        n += 1;
    }
    n
}

#[test]
fn boot_dispatch_fades_both_channels_to_off() {
    let rig = Rig::new(MemStore::new());
    let (mut warm, mut cold) = workers(&rig);
    assert_eq!(run_pending(&mut warm), 1);
    assert_eq!(run_pending(&mut cold), 1);
    assert_eq!(warm.pwm().calls(), vec![PwmCall::Fade(0, 100)]);
    assert_eq!(cold.pwm().calls(), vec![PwmCall::Fade(0, 100)]);
}

#[test]
fn switch_on_reaches_hardware_after_guard() {
    let rig = Rig::settled(MemStore::new());
    let (mut warm, mut cold) = workers(&rig);

    rig.engine.set_on_off(true);
    rig.engine.set_color_temperature(200);
    assert_eq!(run_pending(&mut warm), 0);

    rig.timer.fire_all();
    let want = photometry::derive(&rig.state(), rig.engine.config());
    assert_eq!(run_pending(&mut warm), 1);
    assert_eq!(run_pending(&mut cold), 1);
    assert_eq!(warm.duty(), want.warm.target_duty);
    assert_eq!(cold.duty(), want.cold.target_duty);
    assert!(cold.duty() > warm.duty(), "200 mireds is the cool side");
}

#[test]
fn zero_transition_snaps() {
    let rig = Rig::settled(MemStore::new());
    let (mut warm, _) = workers(&rig);

    rig.engine.set_on_transition_time(0);
    rig.engine.toggle_on_off();
    run_pending(&mut warm);

    let want = photometry::derive(&rig.state(), rig.engine.config());
    assert_eq!(warm.pwm().calls(), vec![PwmCall::Immediate(want.warm.target_duty)]);
}

#[test]
fn buffered_queue_applies_every_step_in_order() {
    let rig = Rig::settled(MemStore::with(&[("onoff", 1)]));
    let (mut warm, _) = workers(&rig);

    for level in [60u8, 120, 180, 240] {
        rig.engine.set_brightness(level);
    }
    assert_eq!(run_pending(&mut warm), 4);

    let duties: Vec<u16> = warm
        .pwm()
        .calls()
        .into_iter()
        .map(|c| match c {
            PwmCall::Immediate(d) | PwmCall::Fade(d, _) => d,
        })
        .collect();
    assert!(duties.windows(2).all(|w| w[0] < w[1]), "{duties:?}");
}
