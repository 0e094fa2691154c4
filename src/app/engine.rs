//! Photometric state engine: the hexagonal core.
//!
//! [`LightEngine`] owns the canonical [`LightState`], the anti-flash guard
//! and the storage / report ports.  Every public operation holds the single
//! state lock for its whole duration:
//!
//! ```text
//!   lock ─▶ mutate ─▶ derive ─▶ dispatch ─▶ persist? ─▶ unlock
//! ```
//!
//! Dispatch only enqueues; the channel workers do the (slow) fading on their
//! own threads, so no operation ever waits on hardware.
//!
//! The handle is cheap to clone and may be shared between the network
//! callback, the button task and the guard timer.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::app::ports::StorageError;
use crate::config::{LightConfig, OFF_DUTY};
use crate::output::queue::DutyCommand;
use crate::output::ChannelOutputs;

use super::commands::LightCommand;
use super::guard::AntiFlashGuard;
use super::photometry;
use super::ports::{GuardTimer, ReportSink, StoragePort};
use super::report::ReportBridge;
use super::state::{
    clamp_brightness, clamp_mireds, LightState, PersistedField, StartupBehavior,
    DEFAULT_BRIGHTNESS, DEFAULT_TEMP,
};

// ───────────────────────────────────────────────────────────────
// Wiring
// ───────────────────────────────────────────────────────────────

/// Driven adapters handed to [`LightEngine::initialize`].
pub struct EnginePorts {
    pub storage: Box<dyn StoragePort>,
    pub reports: Box<dyn ReportSink>,
    pub timer: Box<dyn GuardTimer>,
}

/// Everything guarded by the state lock.
struct EngineCore {
    state: LightState,
    guard: AntiFlashGuard,
    store: Box<dyn StoragePort>,
    reports: ReportBridge,
    default_transition_ms: u16,
}

struct Shared {
    core: Mutex<EngineCore>,
    outputs: ChannelOutputs,
    timer: Box<dyn GuardTimer>,
    config: LightConfig,
}

#[derive(Clone)]
pub struct LightEngine {
    shared: Arc<Shared>,
}

// ───────────────────────────────────────────────────────────────
// Core helpers (lock held)
// ───────────────────────────────────────────────────────────────

impl EngineCore {
    /// Value assumed when a key is missing or unreadable.
    fn fallback(&self, field: PersistedField) -> u16 {
        match field {
            PersistedField::OnTransition | PersistedField::OffTransition => {
                self.default_transition_ms
            }
            _ => field.default_value(),
        }
    }

    fn load(&self, field: PersistedField) -> u16 {
        match self.store.get_u16(field.key()) {
            Ok(v) => v,
            Err(StorageError::NotFound) => {
                debug!("LightEngine: '{}' not stored, using default", field.key());
                self.fallback(field)
            }
            Err(e) => {
                warn!(
                    "LightEngine: read '{}' failed ({}), using default",
                    field.key(),
                    e
                );
                self.fallback(field)
            }
        }
    }

    fn persist(&mut self, field: PersistedField, value: u16) {
        if let Err(e) = self.store.set_u16(field.key(), value) {
            warn!("LightEngine: write '{}'={} failed: {}", field.key(), value, e);
        }
    }

    /// Persist `field` only when the startup policy tracks live state.
    fn persist_tracked(&mut self, field: PersistedField) {
        if self.state.startup.persists_state() {
            let value = self.field_value(field);
            self.persist(field, value);
        }
    }

    fn field_value(&self, field: PersistedField) -> u16 {
        let s = &self.state;
        match field {
            PersistedField::OnOff => u16::from(s.is_on),
            PersistedField::Brightness => u16::from(s.brightness),
            PersistedField::Mireds => s.mireds,
            PersistedField::OnTransition => s.on_transition_ms,
            PersistedField::OffTransition => s.off_transition_ms,
            PersistedField::Startup => u16::from(s.startup.code()),
        }
    }

    /// Rebuild the power-on state from storage according to the stored
    /// startup policy.
    fn restore(&mut self) {
        let code = self.load(PersistedField::Startup);
        let startup = u8::try_from(code)
            .ok()
            .and_then(StartupBehavior::from_code)
            .unwrap_or_else(|| {
                warn!("LightEngine: unknown startup code {}, using Off", code);
                StartupBehavior::Off
            });

        self.state.startup = startup;
        self.state.on_transition_ms = self.load(PersistedField::OnTransition);
        self.state.off_transition_ms = self.load(PersistedField::OffTransition);

        match startup {
            StartupBehavior::PreviousState | StartupBehavior::Toggle => {
                let stored_level = self.load(PersistedField::Brightness);
                self.state.is_on = self.load(PersistedField::OnOff) != 0;
                self.state.brightness = clamp_brightness(u8::try_from(stored_level).unwrap_or(u8::MAX));
                self.state.mireds = clamp_mireds(self.load(PersistedField::Mireds));

                // The inverted value is written by the next on/off change,
                // never at boot.
                if startup == StartupBehavior::Toggle {
                    self.state.is_on = !self.state.is_on;
                    if self.state.is_on {
                        self.state.brightness = DEFAULT_BRIGHTNESS;
                    }
                }
            }
            StartupBehavior::On | StartupBehavior::Off => {
                self.state.is_on = startup == StartupBehavior::On;
                self.state.brightness = DEFAULT_BRIGHTNESS;
                self.state.mireds = DEFAULT_TEMP;
            }
        }
    }
}

impl Shared {
    fn dispatch(&self, core: &EngineCore) {
        if core.guard.is_blocked() {
            debug!("LightEngine: anti-flash window open, dispatch held");
            return;
        }
        let targets = photometry::derive(&core.state, &self.config);
        debug!(
            "LightEngine: warm={} cold={} fade={}ms",
            targets.warm.target_duty, targets.cold.target_duty, targets.warm.fade_ms
        );
        self.outputs.dispatch(targets.warm, targets.cold);
    }
}

// ───────────────────────────────────────────────────────────────
// Public API
// ───────────────────────────────────────────────────────────────

impl LightEngine {
    /// Load the persisted state, apply the startup policy and dispatch the
    /// initial duty targets.
    pub fn initialize(config: LightConfig, outputs: ChannelOutputs, ports: EnginePorts) -> Self {
        let mut core = EngineCore {
            state: LightState {
                on_transition_ms: config.default_transition_ms,
                off_transition_ms: config.default_transition_ms,
                ..LightState::default()
            },
            guard: AntiFlashGuard::new(config.anti_flash_enabled, config.anti_flash_window_ms),
            store: ports.storage,
            reports: ReportBridge::new(ports.reports),
            default_transition_ms: config.default_transition_ms,
        };
        core.restore();

        info!(
            "LightEngine: startup={:?} on={} level={} mireds={} on_t={}ms off_t={}ms",
            core.state.startup,
            core.state.is_on,
            core.state.brightness,
            core.state.mireds,
            core.state.on_transition_ms,
            core.state.off_transition_ms
        );

        let engine = Self {
            shared: Arc::new(Shared {
                core: Mutex::new(core),
                outputs,
                timer: ports.timer,
                config,
            }),
        };
        if let Some(core) = engine.lock("initialize") {
            engine.shared.dispatch(&core);
        }
        engine
    }

    pub fn config(&self) -> &LightConfig {
        &self.shared.config
    }

    /// Copy of the canonical state, or `None` if the lock is poisoned.
    pub fn snapshot(&self) -> Option<LightState> {
        self.lock("snapshot").map(|core| core.state)
    }

    pub fn is_dispatch_blocked(&self) -> bool {
        self.lock("is_dispatch_blocked")
            .is_some_and(|core| core.guard.is_blocked())
    }

    pub fn set_on_off(&self, on: bool) {
        let armed = {
            let Some(mut core) = self.lock("set_on_off") else {
                return;
            };
            if core.state.is_on == on {
                return;
            }
            info!("LightEngine: light {}", if on { "on" } else { "off" });
            core.state.is_on = on;
            let window = core.guard.window();
            let armed = if on { core.guard.arm() } else { None };
            self.shared.dispatch(&core);
            core.persist_tracked(PersistedField::OnOff);
            armed.map(|generation| (generation, window))
        };

        // Started after unlocking: a timer that cannot start runs the expiry
        // inline, which takes the lock.  An expiry from an earlier arm that
        // lands in between is rejected by its generation.
        if let Some((generation, window)) = armed {
            self.start_guard_timer(generation, window);
        }
    }

    pub fn toggle_on_off(&self) {
        let Some(mut core) = self.lock("toggle_on_off") else {
            return;
        };
        core.state.is_on = !core.state.is_on;
        info!("LightEngine: toggled {}", if core.state.is_on { "on" } else { "off" });
        self.shared.dispatch(&core);
        core.persist_tracked(PersistedField::OnOff);
    }

    pub fn set_brightness(&self, level: u8) {
        let level = clamp_brightness(level);
        let Some(mut core) = self.lock("set_brightness") else {
            return;
        };
        if core.state.brightness == level {
            return;
        }
        info!("LightEngine: level {}", level);
        core.state.brightness = level;
        self.shared.dispatch(&core);
        core.persist_tracked(PersistedField::Brightness);
    }

    pub fn set_color_temperature(&self, mireds: u16) {
        let mireds = clamp_mireds(mireds);
        let Some(mut core) = self.lock("set_color_temperature") else {
            return;
        };
        if core.state.mireds == mireds {
            return;
        }
        info!("LightEngine: colour temperature {} mireds", mireds);
        core.state.mireds = mireds;
        self.shared.dispatch(&core);
        core.persist_tracked(PersistedField::Mireds);
    }

    /// Takes effect on the next dispatch.
    pub fn set_on_transition_time(&self, ms: u16) {
        let Some(mut core) = self.lock("set_on_transition_time") else {
            return;
        };
        core.state.on_transition_ms = ms;
        core.persist(PersistedField::OnTransition, ms);
    }

    /// Takes effect on the next dispatch.
    pub fn set_off_transition_time(&self, ms: u16) {
        let Some(mut core) = self.lock("set_off_transition_time") else {
            return;
        };
        core.state.off_transition_ms = ms;
        core.persist(PersistedField::OffTransition, ms);
    }

    pub fn set_startup_behavior(&self, startup: StartupBehavior) {
        let Some(mut core) = self.lock("set_startup_behavior") else {
            return;
        };
        info!("LightEngine: startup behaviour {:?}", startup);
        core.state.startup = startup;
        core.persist(PersistedField::Startup, u16::from(startup.code()));
        for field in [
            PersistedField::OnOff,
            PersistedField::Brightness,
            PersistedField::Mireds,
        ] {
            core.persist_tracked(field);
        }
    }

    /// Write every persisted field's default.  Live state is untouched.
    pub fn clear_persisted(&self) {
        let Some(mut core) = self.lock("clear_persisted") else {
            return;
        };
        warn!("LightEngine: clearing persisted state");
        for field in PersistedField::ALL {
            let value = core.fallback(field);
            core.persist(field, value);
        }
    }

    pub fn report_current_state(&self) {
        let Some(mut core) = self.lock("report_current_state") else {
            return;
        };
        let state = core.state;
        core.reports.publish(&state);
    }

    /// Nonzero: pulse both channels to the identify duty and back to off,
    /// regardless of the light's state.  Zero: restore normal output.
    pub fn identify(&self, time: u16) {
        let Some(core) = self.lock("identify") else {
            return;
        };
        if time == 0 {
            info!("LightEngine: identify end");
            self.shared.dispatch(&core);
            return;
        }

        info!("LightEngine: identify ({})", time);
        let cfg = &self.shared.config;
        let pulse = DutyCommand::new(cfg.identify_duty, cfg.identify_fade_ms);
        let off = DutyCommand::new(OFF_DUTY, cfg.identify_fade_ms);
        self.shared.outputs.dispatch(pulse, pulse);
        self.shared.outputs.dispatch(off, off);
    }

    pub fn handle_command(&self, cmd: LightCommand) {
        match cmd {
            LightCommand::SetOnOff(on) => self.set_on_off(on),
            LightCommand::Toggle => self.toggle_on_off(),
            LightCommand::SetBrightness(level) => self.set_brightness(level),
            LightCommand::SetColorTemperature(mireds) => self.set_color_temperature(mireds),
            LightCommand::SetOnTransitionTime(ms) => self.set_on_transition_time(ms),
            LightCommand::SetOffTransitionTime(ms) => self.set_off_transition_time(ms),
            LightCommand::SetStartupBehavior(b) => self.set_startup_behavior(b),
            LightCommand::Identify(t) => self.identify(t),
            LightCommand::ReportState => self.report_current_state(),
        }
    }

    // ── Internals ─────────────────────────────────────────────

    fn lock(&self, op: &'static str) -> Option<MutexGuard<'_, EngineCore>> {
        match self.shared.core.lock() {
            Ok(core) => Some(core),
            Err(_) => {
                error!("LightEngine: state lock poisoned, {} skipped", op);
                None
            }
        }
    }

    fn start_guard_timer(&self, generation: u32, window: Duration) {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        self.shared.timer.start(
            window,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    LightEngine { shared }.release_guard(generation);
                }
            }),
        );
    }

    /// Guard expiry: dispatch whatever the state is now.
    fn release_guard(&self, generation: u32) {
        let Some(mut core) = self.lock("release_guard") else {
            return;
        };
        if core.guard.release(generation) {
            debug!("LightEngine: anti-flash window closed");
            self.shared.dispatch(&core);
        } else {
            debug!("LightEngine: stale guard expiry {} ignored", generation);
        }
    }
}
