//! Per-channel duty command queue.
//!
//! Single producer (the engine, under its state lock) and single consumer
//! (the channel's fade worker).  Built on `embassy-sync` primitives so the
//! same code serves the FreeRTOS-backed threads on target and plain threads
//! on the host.
//!
//! ```text
//!               LatestWins: Signal  (depth 1, overwrite)
//!  Engine ──push──▶                                    ──receive──▶ Worker
//!               Buffered:   Channel (depth 16, FIFO, drop when full)
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use log::warn;

use crate::config::QueuePolicy;

/// Capacity of a [`QueuePolicy::Buffered`] queue.
pub const BUFFERED_QUEUE_DEPTH: usize = 16;

/// One duty change for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCommand {
    pub target_duty: u16,
    pub fade_ms: u16,
}

impl DutyCommand {
    pub const fn new(target_duty: u16, fade_ms: u16) -> Self {
        Self {
            target_duty,
            fade_ms,
        }
    }
}

enum Slot {
    LatestWins(Signal<CriticalSectionRawMutex, DutyCommand>),
    Buffered(Channel<CriticalSectionRawMutex, DutyCommand, BUFFERED_QUEUE_DEPTH>),
}

pub struct DutyQueue {
    label: &'static str,
    slot: Slot,
    dropped: AtomicU32,
}

impl DutyQueue {
    pub fn new(label: &'static str, policy: QueuePolicy) -> Self {
        let slot = match policy {
            QueuePolicy::LatestWins => Slot::LatestWins(Signal::new()),
            QueuePolicy::Buffered => Slot::Buffered(Channel::new()),
        };
        Self {
            label,
            slot,
            dropped: AtomicU32::new(0),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn policy(&self) -> QueuePolicy {
        match self.slot {
            Slot::LatestWins(_) => QueuePolicy::LatestWins,
            Slot::Buffered(_) => QueuePolicy::Buffered,
        }
    }

    /// Enqueue without blocking.
    ///
    /// Returns `false` if the command was dropped (buffered queue full).
    /// A drop is logged and counted; it is never an error for the caller.
    pub fn push(&self, cmd: DutyCommand) -> bool {
        match &self.slot {
            Slot::LatestWins(signal) => {
                signal.signal(cmd);
                true
            }
            Slot::Buffered(channel) => {
                if channel.try_send(cmd).is_ok() {
                    true
                } else {
                    let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                    warn!(
                        "DutyQueue({}): full, dropping duty={} fade={}ms (dropped={})",
                        self.label, cmd.target_duty, cmd.fade_ms, total
                    );
                    false
                }
            }
        }
    }

    /// Wait for the next command.
    pub async fn receive(&self) -> DutyCommand {
        match &self.slot {
            Slot::LatestWins(signal) => signal.wait().await,
            Slot::Buffered(channel) => channel.receive().await,
        }
    }

    /// Take the next command if one is pending.
    pub fn try_receive(&self) -> Option<DutyCommand> {
        match &self.slot {
            Slot::LatestWins(signal) => signal.try_take(),
            Slot::Buffered(channel) => channel.try_receive().ok(),
        }
    }

    /// Commands dropped because the buffer was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Drain every pending command, oldest first.
    pub fn drain(&self) -> heapless::Vec<DutyCommand, BUFFERED_QUEUE_DEPTH> {
        let mut out = heapless::Vec::new();
        while let Some(cmd) = self.try_receive() {
            if out.push(cmd).is_err() {
                break;
            }
        }
        out
    }
}
