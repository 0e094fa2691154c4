//! Network attribute writes to [`LightCommand`]s.
//!
//! The mesh stack hands us `(cluster, attribute, typed value)` for every
//! attribute written on the light endpoint.  [`decode`] is a pure mapping;
//! [`AttributeDispatcher`] logs what it rejects and forwards the rest to
//! the engine.
//!
//! | Cluster            | Attribute                | Type  |
//! |--------------------|--------------------------|-------|
//! | OnOff 0x0006       | OnOff 0x0000             | Bool  |
//! | OnOff 0x0006       | StartUpOnOff 0x4003      | Enum8 |
//! | Level 0x0008       | CurrentLevel 0x0000      | U8    |
//! | Level 0x0008       | OnTransitionTime 0x0012  | U16   |
//! | Level 0x0008       | OffTransitionTime 0x0013 | U16   |
//! | Color 0x0300       | ColorTemperature 0x0007  | U16   |
//! | Identify 0x0003    | IdentifyTime 0x0000      | U16   |

use core::fmt;

use log::{info, warn};

use super::commands::LightCommand;
use super::engine::LightEngine;
use super::state::StartupBehavior;

// ───────────────────────────────────────────────────────────────
// Identifiers
// ───────────────────────────────────────────────────────────────

pub mod cluster {
    pub const IDENTIFY: u16 = 0x0003;
    pub const ON_OFF: u16 = 0x0006;
    pub const LEVEL: u16 = 0x0008;
    pub const COLOR_CONTROL: u16 = 0x0300;
}

pub mod attr {
    pub const ON_OFF: u16 = 0x0000;
    pub const START_UP_ON_OFF: u16 = 0x4003;
    pub const CURRENT_LEVEL: u16 = 0x0000;
    pub const ON_TRANSITION_TIME: u16 = 0x0012;
    pub const OFF_TRANSITION_TIME: u16 = 0x0013;
    pub const COLOR_TEMPERATURE: u16 = 0x0007;
    pub const IDENTIFY_TIME: u16 = 0x0000;
}

/// ZCL data type tags for the values this light understands.
pub mod type_id {
    pub const BOOL: u8 = 0x10;
    pub const U8: u8 = 0x20;
    pub const U16: u8 = 0x21;
    pub const ENUM8: u8 = 0x30;
}

// ───────────────────────────────────────────────────────────────
// Values
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    Enum8(u8),
}

impl AttrValue {
    /// Parse a little-endian ZCL payload of the given type tag.
    pub fn from_raw(type_tag: u8, data: &[u8]) -> Result<Self, AttributeError> {
        match (type_tag, data) {
            (type_id::BOOL, [b, ..]) => Ok(Self::Bool(*b != 0)),
            (type_id::U8, [b, ..]) => Ok(Self::U8(*b)),
            (type_id::ENUM8, [b, ..]) => Ok(Self::Enum8(*b)),
            (type_id::U16, [lo, hi, ..]) => Ok(Self::U16(u16::from_le_bytes([*lo, *hi]))),
            (type_id::BOOL | type_id::U8 | type_id::ENUM8 | type_id::U16, _) => {
                Err(AttributeError::Truncated)
            }
            _ => Err(AttributeError::UnsupportedType(type_tag)),
        }
    }

    pub const fn type_tag(self) -> u8 {
        match self {
            Self::Bool(_) => type_id::BOOL,
            Self::U8(_) => type_id::U8,
            Self::U16(_) => type_id::U16,
            Self::Enum8(_) => type_id::ENUM8,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeError {
    UnknownCluster(u16),
    UnknownAttribute { cluster: u16, attribute: u16 },
    /// Known attribute, wrong data type.  Carries the type tag received.
    WrongType { cluster: u16, attribute: u16, got: u8 },
    UnknownStartupCode(u8),
    UnsupportedType(u8),
    /// Payload shorter than its type requires.
    Truncated,
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCluster(c) => write!(f, "unhandled cluster 0x{c:04x}"),
            Self::UnknownAttribute { cluster, attribute } => {
                write!(f, "unhandled attribute 0x{attribute:04x} on cluster 0x{cluster:04x}")
            }
            Self::WrongType {
                cluster,
                attribute,
                got,
            } => write!(
                f,
                "invalid type 0x{got:02x} for attribute 0x{attribute:04x} on cluster 0x{cluster:04x}"
            ),
            Self::UnknownStartupCode(code) => write!(f, "unknown StartUpOnOff code {code}"),
            Self::UnsupportedType(t) => write!(f, "unsupported data type 0x{t:02x}"),
            Self::Truncated => write!(f, "payload truncated"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Decoding
// ───────────────────────────────────────────────────────────────

/// Map one attribute write onto a command.  Never touches engine state.
pub fn decode(cluster: u16, attribute: u16, value: AttrValue) -> Result<LightCommand, AttributeError> {
    let wrong_type = AttributeError::WrongType {
        cluster,
        attribute,
        got: value.type_tag(),
    };

    match (cluster, attribute) {
        (cluster::ON_OFF, attr::ON_OFF) => match value {
            AttrValue::Bool(on) => Ok(LightCommand::SetOnOff(on)),
            _ => Err(wrong_type),
        },
        (cluster::ON_OFF, attr::START_UP_ON_OFF) => match value {
            AttrValue::Enum8(code) => StartupBehavior::from_code(code)
                .map(LightCommand::SetStartupBehavior)
                .ok_or(AttributeError::UnknownStartupCode(code)),
            _ => Err(wrong_type),
        },
        (cluster::LEVEL, attr::CURRENT_LEVEL) => match value {
            AttrValue::U8(level) => Ok(LightCommand::SetBrightness(level)),
            _ => Err(wrong_type),
        },
        (cluster::LEVEL, attr::ON_TRANSITION_TIME) => match value {
            AttrValue::U16(ms) => Ok(LightCommand::SetOnTransitionTime(ms)),
            _ => Err(wrong_type),
        },
        (cluster::LEVEL, attr::OFF_TRANSITION_TIME) => match value {
            AttrValue::U16(ms) => Ok(LightCommand::SetOffTransitionTime(ms)),
            _ => Err(wrong_type),
        },
        (cluster::COLOR_CONTROL, attr::COLOR_TEMPERATURE) => match value {
            AttrValue::U16(mireds) => Ok(LightCommand::SetColorTemperature(mireds)),
            _ => Err(wrong_type),
        },
        (cluster::IDENTIFY, attr::IDENTIFY_TIME) => match value {
            AttrValue::U16(t) => Ok(LightCommand::Identify(t)),
            _ => Err(wrong_type),
        },
        (cluster::ON_OFF | cluster::LEVEL | cluster::COLOR_CONTROL | cluster::IDENTIFY, _) => {
            Err(AttributeError::UnknownAttribute { cluster, attribute })
        }
        _ => Err(AttributeError::UnknownCluster(cluster)),
    }
}

/// Decode from a raw type tag and payload, as delivered by the stack.
pub fn decode_raw(
    cluster: u16,
    attribute: u16,
    type_tag: u8,
    data: &[u8],
) -> Result<LightCommand, AttributeError> {
    let value = AttrValue::from_raw(type_tag, data)?;
    decode(cluster, attribute, value)
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

/// Entry point for the network stack's "attribute set" callback.
#[derive(Clone)]
pub struct AttributeDispatcher {
    engine: LightEngine,
}

impl AttributeDispatcher {
    pub fn new(engine: LightEngine) -> Self {
        Self { engine }
    }

    /// Decode and apply one write.  Rejected writes are logged and leave
    /// the light untouched.
    pub fn dispatch(&self, cluster: u16, attribute: u16, value: AttrValue) -> crate::error::Result<()> {
        match decode(cluster, attribute, value) {
            Ok(cmd) => {
                info!("Attributes: {:?}", cmd);
                self.engine.handle_command(cmd);
                Ok(())
            }
            Err(e) => {
                warn!("Attributes: {}", e);
                Err(e.into())
            }
        }
    }

    pub fn dispatch_raw(
        &self,
        cluster: u16,
        attribute: u16,
        type_tag: u8,
        data: &[u8],
    ) -> crate::error::Result<()> {
        match AttrValue::from_raw(type_tag, data) {
            Ok(value) => self.dispatch(cluster, attribute, value),
            Err(e) => {
                warn!(
                    "Attributes: cluster 0x{:04x} attr 0x{:04x}: {}",
                    cluster, attribute, e
                );
                Err(e.into())
            }
        }
    }
}
