//! Single-GPIO status LED.
//!
//! Lit during boot, blinking while waiting for the network, solid once
//! joined.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the status GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use core::time::Duration;

use crate::drivers::hw_init;
use crate::pins;

/// Half-period of the "waiting for network" blink.
pub const BLINK_HALF_PERIOD: Duration = Duration::from_millis(100);

pub struct StatusLed {
    gpio: i32,
    active_high: bool,
    lit: bool,
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new(pins::STATUS_LED_GPIO, pins::STATUS_LED_ACTIVE_HIGH)
    }
}

impl StatusLed {
    pub fn new(gpio: i32, active_high: bool) -> Self {
        Self {
            gpio,
            active_high,
            lit: false,
        }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(self.gpio, lit == self.active_high);
        self.lit = lit;
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.lit);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
