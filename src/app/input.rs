//! Local button actions.
//!
//! | Gesture      | Action                                          |
//! |--------------|-------------------------------------------------|
//! | Short press  | toggle on/off, report state                     |
//! | Double press | apply next preset                               |
//! | Long press   | clear persisted state, factory-reset the network |

use log::{info, warn};

use crate::drivers::button::ButtonEvent;

use super::engine::LightEngine;
use super::ports::NetworkPort;
use super::presets::PresetCycler;

pub struct InputHandler {
    engine: LightEngine,
    presets: PresetCycler,
    network: Box<dyn NetworkPort>,
}

impl InputHandler {
    pub fn new(engine: LightEngine, presets: PresetCycler, network: Box<dyn NetworkPort>) -> Self {
        Self {
            engine,
            presets,
            network,
        }
    }

    pub fn presets(&self) -> &PresetCycler {
        &self.presets
    }

    pub fn handle(&mut self, event: ButtonEvent) {
        info!("Input: {:?}", event);
        match event {
            ButtonEvent::ShortPress => {
                self.engine.toggle_on_off();
                self.engine.report_current_state();
            }
            ButtonEvent::DoublePress => {
                self.presets.cycle(&self.engine);
            }
            ButtonEvent::LongPress => {
                warn!(
                    "Input: factory reset (network {})",
                    if self.network.is_connected() { "joined" } else { "not joined" }
                );
                self.engine.clear_persisted();
                self.network.factory_reset();
            }
        }
    }
}
