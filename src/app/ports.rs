//! Port traits: the hexagonal boundary between the light engine and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ LightEngine (domain)
//! ```
//!
//! Driven adapters (NVS, LEDC, the mesh network stack, timers) implement
//! these traits.  The [`LightEngine`](super::engine::LightEngine) holds them
//! as trait objects so the domain core never touches hardware directly and
//! every port can be replaced by a recording mock in tests.

use core::time::Duration;

use super::report::AttributeReport;

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Non-volatile key/value store of 16-bit values.
///
/// Each call is treated as atomic and synchronous; implementations serialise
/// their own internal writes.  `NotFound` and I/O failures are both
/// answered by the caller with a documented default.
pub trait StoragePort: Send {
    fn get_u16(&self, key: &str) -> Result<u16, StorageError>;

    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: channel worker → LEDC)
// ───────────────────────────────────────────────────────────────

/// One physical PWM output.  Instances are bound to a single channel and
/// owned by that channel's worker.
pub trait PwmPort: Send {
    /// Step change to `duty`.
    fn set_duty_immediate(&mut self, duty: u16) -> Result<(), PwmError>;

    /// Hardware-timed fade from the current duty to `duty`.  Returns once
    /// the fade has completed.
    fn fade_to(&mut self, duty: u16, duration_ms: u16) -> Result<(), PwmError>;
}

// ───────────────────────────────────────────────────────────────
// Report sink (driven adapter: domain → mesh network)
// ───────────────────────────────────────────────────────────────

/// Outward attribute reports.  Rate limiting and transport belong to the
/// network stack behind this trait.
pub trait ReportSink: Send {
    fn send_report(&mut self, report: &AttributeReport) -> Result<(), ReportError>;
}

// ───────────────────────────────────────────────────────────────
// Guard timer (driven adapter: domain → one-shot timer service)
// ───────────────────────────────────────────────────────────────

/// One-shot timer used by the anti-flash guard.
///
/// `on_expiry` runs at most once, on the timer's own context, after `after`
/// has elapsed.  Starting again may or may not drop an earlier pending
/// expiry; the engine discards stale expiries itself.
pub trait GuardTimer: Send + Sync {
    fn start(&self, after: Duration, on_expiry: Box<dyn FnOnce() + Send + 'static>);
}

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: domain → mesh network stack)
// ───────────────────────────────────────────────────────────────

pub trait NetworkPort: Send {
    fn is_connected(&self) -> bool;

    /// Leave the network and reset the stack.  On target this reboots.
    fn factory_reset(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`LightConfig::validate`](crate::config::LightConfig::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error (open/commit failure, wrong value type).
    IoError,
}

/// Errors from [`PwmPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Duty register write rejected by the driver.
    DutyWriteFailed,
    /// Fade could not be configured or started.
    FadeFailed,
}

/// Errors from [`ReportSink`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// Not joined to a network; nothing to report to.
    NotConnected,
    /// The stack refused the attribute update or the report command.
    Rejected,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for PwmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DutyWriteFailed => write!(f, "duty write failed"),
            Self::FadeFailed => write!(f, "fade failed"),
        }
    }
}

impl core::fmt::Display for ReportError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Rejected => write!(f, "rejected by network stack"),
        }
    }
}
