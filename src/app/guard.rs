//! Anti-flash guard.
//!
//! Some network stacks deliver the stale colour/level just before the real
//! one right after an "on" command.  While the guard is blocked the engine
//! keeps mutating state but holds back duty dispatch; when the window closes
//! it dispatches whatever the state is at that moment.
//!
//! ```text
//!   Open ──arm()──▶ Blocked(gen) ──release(gen)──▶ Open
//!                      │  ▲
//!                      └──┘ arm() again: gen+1, older expiries ignored
//! ```

use core::time::Duration;

#[derive(Debug, Clone)]
pub struct AntiFlashGuard {
    enabled: bool,
    blocked: bool,
    generation: u32,
    window: Duration,
}

impl AntiFlashGuard {
    pub fn new(enabled: bool, window_ms: u16) -> Self {
        Self {
            enabled,
            blocked: false,
            generation: 0,
            window: Duration::from_millis(u64::from(window_ms)),
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Start (or restart) the blocking window.
    ///
    /// Returns the generation the expiry must present to
    /// [`release`](Self::release), or `None` when the guard is disabled.
    pub fn arm(&mut self) -> Option<u32> {
        if !self.enabled {
            return None;
        }
        self.generation = self.generation.wrapping_add(1);
        self.blocked = true;
        Some(self.generation)
    }

    /// Close the window opened by `generation`.
    ///
    /// Returns `true` if this call unblocked the guard.  Expiries from an
    /// earlier arm are ignored.
    pub fn release(&mut self, generation: u32) -> bool {
        if !self.blocked || generation != self.generation {
            return false;
        }
        self.blocked = false;
        true
    }
}
