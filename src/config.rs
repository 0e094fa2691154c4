//! Light driver configuration parameters
//!
//! Everything here is resolved before the engine starts and never changes at
//! runtime.  The defaults reproduce the reference hardware: two 11-bit LEDC
//! channels at 25 kHz, gamma 1.5, 200 ms anti-flash window.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::pins;

/// Full-on duty for the configured LEDC resolution.
pub const MAX_DUTY: u16 = 1 << pins::PWM_RESOLUTION_BITS;
/// Lowest visible duty; gamma mode maps brightness 1 onto (roughly) this.
pub const MIN_DUTY: u16 = 150;
pub const OFF_DUTY: u16 = 0;

/// Brightness-to-duty mapping.  Exactly one is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BrightnessCurve {
    /// `round((b / 254)^gamma * (max - min)) + min`
    Gamma(f32),
    /// `round(max * b / 254)`
    Linear,
}

/// Delivery policy for the per-channel duty queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueuePolicy {
    /// Depth-1 slot; a new command replaces any unconsumed one.
    LatestWins,
    /// FIFO of [`BUFFERED_QUEUE_DEPTH`](crate::output::queue::BUFFERED_QUEUE_DEPTH);
    /// commands arriving while full are dropped.
    Buffered,
}

/// Core light configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    // --- Photometry ---
    pub brightness_curve: BrightnessCurve,
    /// Transition time used until a stored or network value replaces it.
    pub default_transition_ms: u16,

    // --- Anti-flash workaround ---
    /// Suppress duty dispatch for a short window after switching on.
    pub anti_flash_enabled: bool,
    pub anti_flash_window_ms: u16,

    // --- Output channels ---
    pub queue_policy: QueuePolicy,
    /// Fades longer than this snap to the target instead.
    pub max_fade_ms: u16,
    pub min_duty: u16,
    pub max_duty: u16,
    pub pwm_frequency_hz: u32,

    // --- Identify pulse ---
    pub identify_duty: u16,
    pub identify_fade_ms: u16,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            // Photometry
            brightness_curve: BrightnessCurve::Gamma(1.5),
            default_transition_ms: 100,

            // Anti-flash
            anti_flash_enabled: true,
            anti_flash_window_ms: 200,

            // Output
            queue_policy: QueuePolicy::Buffered,
            max_fade_ms: 5000,
            min_duty: MIN_DUTY,
            max_duty: MAX_DUTY,
            pwm_frequency_hz: pins::PWM_FREQ_HZ,

            // Identify
            identify_duty: MAX_DUTY / 2,
            identify_fade_ms: 200,
        }
    }
}

impl LightConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let BrightnessCurve::Gamma(gamma) = self.brightness_curve {
            if !(0.1..=5.0).contains(&gamma) {
                return Err(ConfigError::ValidationFailed("gamma must be 0.1–5.0"));
            }
        }
        if self.max_duty == 0 || self.max_duty > MAX_DUTY {
            return Err(ConfigError::ValidationFailed(
                "max_duty must be 1–2^resolution",
            ));
        }
        if self.min_duty >= self.max_duty {
            return Err(ConfigError::ValidationFailed("min_duty must be < max_duty"));
        }
        if self.identify_duty > self.max_duty {
            return Err(ConfigError::ValidationFailed(
                "identify_duty must be <= max_duty",
            ));
        }
        if self.anti_flash_enabled && !(1..=2000).contains(&self.anti_flash_window_ms) {
            return Err(ConfigError::ValidationFailed(
                "anti_flash_window_ms must be 1–2000",
            ));
        }
        if !(1_000..=40_000).contains(&self.pwm_frequency_hz) {
            return Err(ConfigError::ValidationFailed(
                "pwm_frequency_hz must be 1000–40000",
            ));
        }
        Ok(())
    }
}
