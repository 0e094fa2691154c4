//! Preset cycler for the local button.
//!
//! Each cycle applies the preset under the cursor, reports the result and
//! moves on, wrapping at the end of the list.

use log::{info, warn};

use super::engine::LightEngine;
use super::state::{DEFAULT_TEMP, MAX_BRIGHTNESS, MAX_TEMP, MIN_TEMP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightPreset {
    pub mireds: u16,
    pub brightness: u8,
}

impl LightPreset {
    pub const fn new(mireds: u16, brightness: u8) -> Self {
        Self { mireds, brightness }
    }
}

/// Warm, neutral, cool; each at ~20 %, ~50 % and full.
pub const DEFAULT_PRESETS: [LightPreset; 9] = [
    LightPreset::new(MAX_TEMP, MAX_BRIGHTNESS / 5),
    LightPreset::new(MAX_TEMP, MAX_BRIGHTNESS / 2),
    LightPreset::new(MAX_TEMP, MAX_BRIGHTNESS),
    LightPreset::new(DEFAULT_TEMP, MAX_BRIGHTNESS / 5),
    LightPreset::new(DEFAULT_TEMP, MAX_BRIGHTNESS / 2),
    LightPreset::new(DEFAULT_TEMP, MAX_BRIGHTNESS),
    LightPreset::new(MIN_TEMP, MAX_BRIGHTNESS / 5),
    LightPreset::new(MIN_TEMP, MAX_BRIGHTNESS / 2),
    LightPreset::new(MIN_TEMP, MAX_BRIGHTNESS),
];

pub struct PresetCycler {
    presets: &'static [LightPreset],
    cursor: usize,
}

impl Default for PresetCycler {
    fn default() -> Self {
        Self::new(&DEFAULT_PRESETS)
    }
}

impl PresetCycler {
    pub fn new(presets: &'static [LightPreset]) -> Self {
        Self { presets, cursor: 0 }
    }

    /// Index of the preset the next [`cycle`](Self::cycle) applies.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Apply the current preset and advance.  Returns the preset applied.
    pub fn cycle(&mut self, engine: &LightEngine) -> Option<LightPreset> {
        let Some(&preset) = self.presets.get(self.cursor) else {
            warn!("Presets: list is empty");
            return None;
        };
        info!(
            "Presets: #{} -> level {} @ {} mireds",
            self.cursor, preset.brightness, preset.mireds
        );

        engine.set_brightness(preset.brightness);
        engine.set_color_temperature(preset.mireds);
        engine.report_current_state();

        self.cursor = (self.cursor + 1) % self.presets.len();
        Some(preset)
    }
}
