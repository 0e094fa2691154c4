//! GPIO / peripheral pin assignments for the CCT driver board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// LED strip MOSFET gates (LEDC PWM)
// ---------------------------------------------------------------------------

/// Warm-white strip gate.
pub const WARM_PWM_GPIO: i32 = 7;
/// Cold-white strip gate.
pub const COLD_PWM_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Status LED (single discrete LED, active HIGH)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 15;
pub const STATUS_LED_ACTIVE_HIGH: bool = true;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  11-bit gives 0 – 2048 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 11;
/// LEDC base frequency for both strips (25 kHz, above the audible range).
pub const PWM_FREQ_HZ: u32 = 25_000;

// ---------------------------------------------------------------------------
// User button (active-low with internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button (boot button on the ESP32-C6/H2 dev boards).
pub const BUTTON_GPIO: i32 = 9;
