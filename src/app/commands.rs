//! Inbound commands to the light engine.
//!
//! Produced by [`attributes::decode`](super::attributes::decode) from
//! network attribute writes, and by local inputs.  The
//! [`LightEngine`](super::engine::LightEngine) routes each one to the
//! matching operation in
//! [`handle_command`](super::engine::LightEngine::handle_command).

use super::state::StartupBehavior;

/// Actions the outside world can request of the light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    SetOnOff(bool),
    Toggle,
    /// Raw level; clamped to `0..=254` by the engine.
    SetBrightness(u8),
    /// Mireds; clamped to the supported range by the engine.
    SetColorTemperature(u16),
    SetOnTransitionTime(u16),
    SetOffTransitionTime(u16),
    SetStartupBehavior(StartupBehavior),
    /// Nonzero starts the identify pulse, zero restores normal output.
    Identify(u16),
    /// Push the current on/off, level and colour temperature out.
    ReportState,
}
