//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements   | Connects to                 |
//! |---------------|--------------|-----------------------------|
//! | `guard_timer` | GuardTimer   | esp_timer / sim thread      |
//! | `log_sink`    | ReportSink   | Serial log output           |
//! | `network`     | NetworkPort  | Standalone (no mesh stack)  |
//! | `nvs`         | StoragePort  | NVS / in-memory store       |
//! | `time`        | —            | ESP32 system timer          |
//!
//! The PWM port is implemented by [`crate::drivers::ledc::LedcChannel`].

pub mod guard_timer;
pub mod log_sink;
pub mod network;
pub mod nvs;
pub mod time;
