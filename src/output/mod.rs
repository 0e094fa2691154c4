//! Per-channel fade driver: two duty queues and their worker loops.
//!
//! ```text
//! ┌──────────────┐  DutyCommand  ┌──────────────┐   LEDC CH0
//! │              │──────────────▶│ warm worker  │──────────▶ warm strip
//! │ LightEngine  │               └──────────────┘
//! │  (producer)  │  DutyCommand  ┌──────────────┐   LEDC CH1
//! │              │──────────────▶│ cold worker  │──────────▶ cold strip
//! └──────────────┘               └──────────────┘
//! ```

pub mod queue;
pub mod worker;

use std::sync::Arc;

use log::warn;

use crate::app::ports::PwmPort;
use crate::config::{LightConfig, QueuePolicy};
use crate::drivers::task_pin;

use queue::{DutyCommand, DutyQueue};
use worker::ChannelFadeWorker;

const WORKER_PRIORITY: u8 = 1;
const WORKER_STACK_KB: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Warm,
    Cold,
}

impl Channel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cold => "cold",
        }
    }
}

/// Producer side of both channels.  Cloning shares the same queues.
#[derive(Clone)]
pub struct ChannelOutputs {
    warm: Arc<DutyQueue>,
    cold: Arc<DutyQueue>,
}

impl ChannelOutputs {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            warm: Arc::new(DutyQueue::new(Channel::Warm.label(), policy)),
            cold: Arc::new(DutyQueue::new(Channel::Cold.label(), policy)),
        }
    }

    pub fn queue(&self, channel: Channel) -> &Arc<DutyQueue> {
        match channel {
            Channel::Warm => &self.warm,
            Channel::Cold => &self.cold,
        }
    }

    /// Enqueue one command on each channel.  Drops are logged by the queue.
    pub fn dispatch(&self, warm: DutyCommand, cold: DutyCommand) {
        let warm_ok = self.warm.push(warm);
        let cold_ok = self.cold.push(cold);
        if !(warm_ok && cold_ok) {
            warn!(
                "ChannelOutputs: partial dispatch (warm={}, cold={})",
                warm_ok, cold_ok
            );
        }
    }
}

/// Start one worker thread per channel.  The threads run for the lifetime
/// of the process.
pub fn spawn_channel_workers<W, C>(
    outputs: &ChannelOutputs,
    warm: W,
    cold: C,
    config: &LightConfig,
) -> std::io::Result<()>
where
    W: PwmPort + 'static,
    C: PwmPort + 'static,
{
    let warm_worker =
        ChannelFadeWorker::new(warm, Arc::clone(&outputs.warm), config.max_fade_ms);
    let cold_worker =
        ChannelFadeWorker::new(cold, Arc::clone(&outputs.cold), config.max_fade_ms);

    task_pin::spawn_task(WORKER_PRIORITY, WORKER_STACK_KB, "warm\0", move || {
        warm_worker.run()
    })?;
    task_pin::spawn_task(WORKER_PRIORITY, WORKER_STACK_KB, "cold\0", move || {
        cold_worker.run()
    })?;
    Ok(())
}
