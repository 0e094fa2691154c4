//! One-shot timer service for the anti-flash guard.
//!
//! - **`target_os = "espidf"`**: a single `esp_timer` dispatched from the
//!   ESP timer task.  Each `start` re-arms it with `esp_timer_start_once`;
//!   an expiry still pending from an earlier start is replaced.
//! - **`not(target_os = "espidf")`**: a named thread owns every pending
//!   expiry and sleeps until the earliest one is due.
//!
//! Callbacks never run on the caller's context, so they are free to take
//! the engine lock.

use core::time::Duration;

use crate::app::ports::GuardTimer;

type Expiry = Box<dyn FnOnce() + Send + 'static>;

// ───────────────────────────────────────────────────────────────
// ESP-IDF: esp_timer
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use std::sync::Mutex;

#[cfg(target_os = "espidf")]
pub struct OneShotTimer {
    handle: esp_timer_handle_t,
    /// Boxed so its address, handed to the C callback, never moves.
    slot: Box<Mutex<Option<Expiry>>>,
}

// SAFETY: the handle is only passed to esp_timer calls, which are
// thread-safe; the callback slot is behind a mutex.
#[cfg(target_os = "espidf")]
unsafe impl Send for OneShotTimer {}
#[cfg(target_os = "espidf")]
unsafe impl Sync for OneShotTimer {}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn guard_expiry_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the slot owned by the OneShotTimer, which deletes the
    // timer before freeing it.
    let slot = unsafe { &*(arg as *const Mutex<Option<Expiry>>) };
    let fire = match slot.lock() {
        Ok(mut pending) => pending.take(),
        Err(_) => None,
    };
    if let Some(fire) = fire {
        fire();
    }
}

#[cfg(target_os = "espidf")]
impl OneShotTimer {
    pub fn new() -> std::io::Result<Self> {
        let slot: Box<Mutex<Option<Expiry>>> = Box::new(Mutex::new(None));
        let args = esp_timer_create_args_t {
            callback: Some(guard_expiry_cb),
            arg: (&*slot as *const Mutex<Option<Expiry>>).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"guard\0".as_ptr().cast(),
            skip_unhandled_events: false,
        };
        let mut handle: esp_timer_handle_t = core::ptr::null_mut();
        // SAFETY: `args` outlives the call; `handle` receives the new timer.
        let ret = unsafe { esp_timer_create(&args, &mut handle) };
        if ret != ESP_OK {
            return Err(std::io::Error::other(format!(
                "esp_timer_create failed (rc={})",
                ret
            )));
        }
        Ok(Self { handle, slot })
    }
}

#[cfg(target_os = "espidf")]
impl GuardTimer for OneShotTimer {
    fn start(&self, after: Duration, on_expiry: Expiry) {
        // SAFETY: valid handle until Drop.  Stopping an idle timer only
        // returns ESP_ERR_INVALID_STATE.
        unsafe { esp_timer_stop(self.handle) };

        match self.slot.lock() {
            Ok(mut pending) => *pending = Some(on_expiry),
            Err(_) => {
                log::warn!("GuardTimer: slot poisoned, expiring immediately");
                on_expiry();
                return;
            }
        }

        let us = u64::try_from(after.as_micros()).unwrap_or(u64::MAX);
        // SAFETY: valid handle until Drop.
        let ret = unsafe { esp_timer_start_once(self.handle, us) };
        if ret != ESP_OK {
            log::warn!("GuardTimer: start failed (rc={}), expiring immediately", ret);
            // SAFETY: timer is not running, so the callback cannot race us.
            unsafe { guard_expiry_cb((&*self.slot as *const Mutex<Option<Expiry>>).cast_mut().cast()) };
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for OneShotTimer {
    fn drop(&mut self) {
        // SAFETY: handle was created in `new`; after delete the callback can
        // no longer see the slot.
        unsafe {
            esp_timer_stop(self.handle);
            esp_timer_delete(self.handle);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation: timer thread
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
#[cfg(not(target_os = "espidf"))]
use std::time::Instant;

#[cfg(not(target_os = "espidf"))]
const TIMER_PRIORITY: u8 = 2;
#[cfg(not(target_os = "espidf"))]
const TIMER_STACK_KB: usize = 4;

#[cfg(not(target_os = "espidf"))]
pub struct OneShotTimer {
    tx: Sender<(Instant, Expiry)>,
}

#[cfg(not(target_os = "espidf"))]
impl OneShotTimer {
    /// Spawn the timer thread.
    pub fn new() -> std::io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        crate::drivers::task_pin::spawn_task(TIMER_PRIORITY, TIMER_STACK_KB, "guard-timer\0", move || {
            timer_loop(&rx);
        })?;
        Ok(Self { tx })
    }
}

#[cfg(not(target_os = "espidf"))]
impl GuardTimer for OneShotTimer {
    fn start(&self, after: Duration, on_expiry: Expiry) {
        let deadline = Instant::now() + after;
        if let Err(mpsc::SendError((_, on_expiry))) = self.tx.send((deadline, on_expiry)) {
            log::warn!("GuardTimer(sim): timer thread stopped, expiring immediately");
            on_expiry();
        }
    }
}

#[cfg(not(target_os = "espidf"))]
fn timer_loop(rx: &Receiver<(Instant, Expiry)>) {
    let mut pending: Vec<(Instant, Expiry)> = Vec::new();
    let mut connected = true;

    loop {
        let now = Instant::now();
        let mut i = 0;
        while i < pending.len() {
            if pending[i].0 <= now {
                let (_, fire) = pending.swap_remove(i);
                fire();
            } else {
                i += 1;
            }
        }

        let next = pending.iter().map(|(deadline, _)| *deadline).min();
        match (next, connected) {
            (None, false) => {
                log::debug!("GuardTimer(sim): all handles dropped, exiting");
                return;
            }
            (Some(deadline), false) => {
                std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
            }
            (None, true) => match rx.recv() {
                Ok(entry) => pending.push(entry),
                Err(_) => connected = false,
            },
            (Some(deadline), true) => {
                match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                    Ok(entry) => pending.push(entry),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => connected = false,
                }
            }
        }
    }
}
