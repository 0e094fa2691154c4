//! LEDC light channel driver.
//!
//! One [`LedcChannel`] per physical output, owned by that channel's fade
//! worker.  Fades use the LEDC hardware fade engine and block the calling
//! thread until the fade completes.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the LEDC channel configured in `hw_init`.
//! On host/test: the duty is tracked in memory and fades complete at once.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::app::ports::{PwmError, PwmPort};

pub struct LedcChannel {
    channel: u32,
    max_duty: u16,
    duty: u16,
}

impl LedcChannel {
    /// `channel` must already be configured by
    /// [`init_peripherals`](super::hw_init::init_peripherals).
    pub fn new(channel: u32, max_duty: u16) -> Self {
        Self {
            channel,
            max_duty,
            duty: 0,
        }
    }

    /// Last duty written (or faded to).
    pub fn duty(&self) -> u16 {
        self.duty
    }

    #[cfg(target_os = "espidf")]
    fn write_duty(&mut self, duty: u16) -> Result<(), PwmError> {
        // SAFETY: this channel is owned exclusively by one worker thread.
        unsafe {
            if ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel, u32::from(duty))
                != ESP_OK as i32
            {
                return Err(PwmError::DutyWriteFailed);
            }
            if ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, self.channel) != ESP_OK as i32 {
                return Err(PwmError::DutyWriteFailed);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_duty(&mut self, duty: u16) -> Result<(), PwmError> {
        log::trace!("LEDC(sim) ch{}: duty {}", self.channel, duty);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn run_fade(&mut self, duty: u16, duration_ms: u16) -> Result<(), PwmError> {
        // SAFETY: fade service installed in hw_init; channel owned by caller.
        unsafe {
            if ledc_set_fade_with_time(
                ledc_mode_t_LEDC_LOW_SPEED_MODE,
                self.channel,
                u32::from(duty),
                i32::from(duration_ms),
            ) != ESP_OK as i32
            {
                return Err(PwmError::FadeFailed);
            }
            if ledc_fade_start(
                ledc_mode_t_LEDC_LOW_SPEED_MODE,
                self.channel,
                ledc_fade_mode_t_LEDC_FADE_WAIT_DONE,
            ) != ESP_OK as i32
            {
                return Err(PwmError::FadeFailed);
            }
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn run_fade(&mut self, duty: u16, duration_ms: u16) -> Result<(), PwmError> {
        log::trace!("LEDC(sim) ch{}: fade to {} in {}ms", self.channel, duty, duration_ms);
        Ok(())
    }
}

impl PwmPort for LedcChannel {
    fn set_duty_immediate(&mut self, duty: u16) -> Result<(), PwmError> {
        let duty = duty.min(self.max_duty);
        self.write_duty(duty)?;
        self.duty = duty;
        Ok(())
    }

    fn fade_to(&mut self, duty: u16, duration_ms: u16) -> Result<(), PwmError> {
        let duty = duty.min(self.max_duty);
        self.run_fade(duty, duration_ms)?;
        self.duty = duty;
        Ok(())
    }
}

// ── embedded-hal ─────────────────────────────────────────────

impl embedded_hal::pwm::Error for PwmError {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

impl embedded_hal::pwm::ErrorType for LedcChannel {
    type Error = PwmError;
}

impl embedded_hal::pwm::SetDutyCycle for LedcChannel {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.set_duty_immediate(duty)
    }
}
