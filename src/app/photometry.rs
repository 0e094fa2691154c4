//! Duty derivation: photometric state to per-channel PWM targets.
//!
//! Pure functions, no locking.  The engine calls [`derive`] with a copy of
//! its state every time a dispatch is due.

use crate::config::{BrightnessCurve, LightConfig, OFF_DUTY};
use crate::output::queue::DutyCommand;

use super::state::{clamp_mireds, LightState, MAX_BRIGHTNESS, MAX_TEMP, MIN_TEMP};

/// One command per channel, ready to enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyTargets {
    pub warm: DutyCommand,
    pub cold: DutyCommand,
}

impl DutyTargets {
    pub const fn both(duty: u16, fade_ms: u16) -> Self {
        Self {
            warm: DutyCommand::new(duty, fade_ms),
            cold: DutyCommand::new(duty, fade_ms),
        }
    }
}

/// Share of the total duty given to the (warm, cold) channel.
///
/// Warm share is 0 at `MIN_TEMP` (coolest) and 1 at `MAX_TEMP`; the two
/// shares always sum to 1.  Out-of-range input is clamped first.
pub fn channel_fractions(mireds: u16) -> (f32, f32) {
    let m = clamp_mireds(mireds);
    let warm = f32::from(m - MIN_TEMP) / f32::from(MAX_TEMP - MIN_TEMP);
    (warm, 1.0 - warm)
}

/// Combined duty of both channels for `brightness`.
pub fn total_duty(brightness: u8, curve: BrightnessCurve, min_duty: u16, max_duty: u16) -> u16 {
    let level = f32::from(brightness.min(MAX_BRIGHTNESS)) / f32::from(MAX_BRIGHTNESS);
    match curve {
        BrightnessCurve::Gamma(gamma) => {
            let span = f32::from(max_duty.saturating_sub(min_duty));
            let scaled = (level.powf(gamma) * span).round() as u16;
            scaled.saturating_add(min_duty).min(max_duty)
        }
        BrightnessCurve::Linear => (f32::from(max_duty) * level).round() as u16,
    }
}

/// Duty targets for `state` under `config`.
///
/// Off (or brightness 0) sends both channels to zero over the off
/// transition; otherwise the total is split by colour temperature and sent
/// over the on transition.
pub fn derive(state: &LightState, config: &LightConfig) -> DutyTargets {
    if !state.is_on || state.brightness == 0 {
        return DutyTargets::both(OFF_DUTY, state.off_transition_ms);
    }

    let total = total_duty(
        state.brightness,
        config.brightness_curve,
        config.min_duty,
        config.max_duty,
    );
    let (warm_fraction, cold_fraction) = channel_fractions(state.mireds);
    let total = f32::from(total);

    DutyTargets {
        warm: DutyCommand::new(
            (total * warm_fraction).round() as u16,
            state.on_transition_ms,
        ),
        cold: DutyCommand::new(
            (total * cold_fraction).round() as u16,
            state.on_transition_ms,
        ),
    }
}
