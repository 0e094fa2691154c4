//! Standalone network adapter.
//!
//! [`NetworkPort`] for builds without a mesh stack: the device counts as
//! joined from boot, and a factory reset restarts the chip so the cleared
//! state is loaded fresh.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::ports::NetworkPort;

pub struct StandaloneNetwork {
    joined: AtomicBool,
}

impl Default for StandaloneNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl StandaloneNetwork {
    pub fn new() -> Self {
        info!("Network: standalone mode (no mesh stack)");
        Self {
            joined: AtomicBool::new(true),
        }
    }
}

impl NetworkPort for StandaloneNetwork {
    fn is_connected(&self) -> bool {
        self.joined.load(Ordering::Acquire)
    }

    #[cfg(target_os = "espidf")]
    fn factory_reset(&mut self) {
        warn!("Network: factory reset, restarting");
        self.joined.store(false, Ordering::Release);
        // SAFETY: esp_restart never returns; all persisted writes are
        // committed synchronously before this point.
        unsafe { esp_idf_svc::sys::esp_restart() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn factory_reset(&mut self) {
        warn!("Network(sim): factory reset, left network");
        self.joined.store(false, Ordering::Release);
    }
}
