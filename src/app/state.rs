//! Canonical light state and its persisted layout.
//!
//! The engine owns the only live [`LightState`]; everything else sees copies.

use serde::{Deserialize, Serialize};

pub const MIN_TEMP: u16 = 167;
pub const MAX_TEMP: u16 = 370;
/// Midpoint of the supported range (~3700 K).
pub const DEFAULT_TEMP: u16 = (MIN_TEMP + MAX_TEMP) / 2;

pub const MIN_BRIGHTNESS: u8 = 0;
pub const MAX_BRIGHTNESS: u8 = 254;
/// ~20 %: the level used whenever nothing better is known.
pub const DEFAULT_BRIGHTNESS: u8 = 51;

pub const DEFAULT_TRANSITION_MS: u16 = 100;

/// Power-on policy.  Also decides whether state changes are persisted.
///
/// Discriminants are the Zigbee `StartUpOnOff` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum StartupBehavior {
    #[default]
    Off = 0,
    On = 1,
    Toggle = 2,
    PreviousState = 255,
}

impl StartupBehavior {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            2 => Some(Self::Toggle),
            255 => Some(Self::PreviousState),
            _ => None,
        }
    }

    /// Whether on/off, brightness and colour temperature follow every change
    /// into storage.
    pub const fn persists_state(self) -> bool {
        matches!(self, Self::Toggle | Self::PreviousState)
    }
}

/// One 16-bit slot in the non-volatile store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistedField {
    OnOff,
    Brightness,
    Mireds,
    OnTransition,
    OffTransition,
    Startup,
}

impl PersistedField {
    pub const ALL: [Self; 6] = [
        Self::OnOff,
        Self::Brightness,
        Self::Mireds,
        Self::OnTransition,
        Self::OffTransition,
        Self::Startup,
    ];

    /// NVS key (max 15 chars).
    pub const fn key(self) -> &'static str {
        match self {
            Self::OnOff => "state",
            Self::Brightness => "brightness",
            Self::Mireds => "mireds",
            Self::OnTransition => "ontime",
            Self::OffTransition => "offtime",
            Self::Startup => "onoff",
        }
    }

    /// Value written by a factory reset and assumed when the key is missing.
    pub const fn default_value(self) -> u16 {
        match self {
            Self::OnOff => 0,
            Self::Brightness => MIN_BRIGHTNESS as u16,
            Self::Mireds => DEFAULT_TEMP,
            Self::OnTransition | Self::OffTransition => DEFAULT_TRANSITION_MS,
            Self::Startup => StartupBehavior::Off.code() as u16,
        }
    }
}

/// The photometric state of the lamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub is_on: bool,
    pub brightness: u8,
    pub mireds: u16,
    pub on_transition_ms: u16,
    pub off_transition_ms: u16,
    pub startup: StartupBehavior,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            is_on: false,
            brightness: DEFAULT_BRIGHTNESS,
            mireds: DEFAULT_TEMP,
            on_transition_ms: DEFAULT_TRANSITION_MS,
            off_transition_ms: DEFAULT_TRANSITION_MS,
            startup: StartupBehavior::Off,
        }
    }
}

pub const fn clamp_mireds(mireds: u16) -> u16 {
    if mireds < MIN_TEMP {
        MIN_TEMP
    } else if mireds > MAX_TEMP {
        MAX_TEMP
    } else {
        mireds
    }
}

pub const fn clamp_brightness(brightness: u8) -> u8 {
    if brightness > MAX_BRIGHTNESS {
        MAX_BRIGHTNESS
    } else {
        brightness
    }
}
