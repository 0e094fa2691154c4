//! Light channel drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod hw_init;
pub mod ledc;
pub mod status_led;
pub mod task_pin;
