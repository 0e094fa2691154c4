//! Channel fade worker.
//!
//! One worker per output channel.  It owns the channel's PWM handle and
//! loops forever:
//!
//! ```text
//!   Idle ──command──▶ Executing ──done──▶ Idle
//! ```
//!
//! A fade blocks only this worker, so warm and cold progress independently
//! and each channel applies its own commands strictly one after another.
//! Nothing is reported back to the engine.

use std::sync::Arc;

use log::{debug, warn};

use crate::app::ports::{PwmError, PwmPort};

use super::queue::{DutyCommand, DutyQueue};

/// How a command will be applied to the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePlan {
    /// Step change to the target.
    Immediate,
    /// Hardware fade over the command's duration.
    Fade,
}

/// Zero-length and over-long fades snap; everything else fades.
pub fn plan(cmd: &DutyCommand, max_fade_ms: u16) -> FadePlan {
    if cmd.fade_ms == 0 || cmd.fade_ms > max_fade_ms {
        FadePlan::Immediate
    } else {
        FadePlan::Fade
    }
}

pub struct ChannelFadeWorker<P: PwmPort> {
    pwm: P,
    queue: Arc<DutyQueue>,
    max_fade_ms: u16,
    duty: u16,
}

impl<P: PwmPort> ChannelFadeWorker<P> {
    /// The hardware is assumed to start at duty 0.
    pub fn new(pwm: P, queue: Arc<DutyQueue>, max_fade_ms: u16) -> Self {
        Self {
            pwm,
            queue,
            max_fade_ms,
            duty: 0,
        }
    }

    /// Last duty successfully applied to the hardware.
    pub fn duty(&self) -> u16 {
        self.duty
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    /// Apply one command.  On failure the tracked duty is left unchanged.
    pub fn execute(&mut self, cmd: DutyCommand) -> Result<(), PwmError> {
        let label = self.queue.label();
        debug!(
            "Worker({}): {} -> {} duty in {}ms",
            label, self.duty, cmd.target_duty, cmd.fade_ms
        );
        match plan(&cmd, self.max_fade_ms) {
            FadePlan::Immediate => self.pwm.set_duty_immediate(cmd.target_duty)?,
            FadePlan::Fade => self.pwm.fade_to(cmd.target_duty, cmd.fade_ms)?,
        }
        self.duty = cmd.target_duty;
        Ok(())
    }

    /// Execute a pending command, if any, without waiting.
    /// Returns `true` when a command was consumed.
    pub fn poll_once(&mut self) -> bool {
        match self.queue.try_receive() {
            Some(cmd) => {
                self.handle(cmd);
                true
            }
            None => false,
        }
    }

    /// Worker loop.  Blocks on the queue while idle and never returns.
    pub fn run(mut self) -> ! {
        loop {
            let cmd = futures_lite::future::block_on(self.queue.receive());
            self.handle(cmd);
        }
    }

    fn handle(&mut self, cmd: DutyCommand) {
        if let Err(e) = self.execute(cmd) {
            warn!(
                "Worker({}): duty {} not applied: {}",
                self.queue.label(),
                cmd.target_duty,
                e
            );
        }
    }
}
