//! Unified error type for the light firmware.
//!
//! A single `Error` enum that every subsystem converts into, so callers at
//! the edges (attribute dispatch, bring-up) handle failures uniformly.  All
//! variants are `Copy`; nothing here allocates.

use core::fmt;

use crate::app::attributes::AttributeError;
use crate::app::ports::{ConfigError, PwmError, ReportError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Non-volatile store read or write failed.
    Storage(StorageError),
    /// LEDC duty or fade operation failed.
    Pwm(PwmError),
    /// Attribute report could not be delivered.
    Report(ReportError),
    /// Incoming attribute write was malformed.
    Attribute(AttributeError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Pwm(e) => write!(f, "pwm: {e}"),
            Self::Report(e) => write!(f, "report: {e}"),
            Self::Attribute(e) => write!(f, "attribute: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<PwmError> for Error {
    fn from(e: PwmError) -> Self {
        Self::Pwm(e)
    }
}

impl From<ReportError> for Error {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

impl From<AttributeError> for Error {
    fn from(e: AttributeError) -> Self {
        Self::Attribute(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
