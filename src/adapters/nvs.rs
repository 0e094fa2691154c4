//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`StoragePort`] over a single NVS namespace of `u16` values.
//!
//! - **`target_os = "espidf"`**: `nvs_get_u16` / `nvs_set_u16` with a commit
//!   after every write.  Each call opens and closes its own handle, so writes
//!   are atomic per key.
//! - **`not(target_os = "espidf")`**: in-memory map for host tests and
//!   simulation.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{StorageError, StoragePort};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

/// Namespace holding every persisted light field.
pub const NAMESPACE: &str = "cctlight";

/// NVS limits keys and namespaces to 15 bytes plus the terminator.
const NVS_KEY_BUF: usize = 16;

pub struct NvsStore {
    namespace: &'static str,
    #[cfg(not(target_os = "espidf"))]
    values: HashMap<String, u16>,
}

impl Default for NvsStore {
    /// Store without flash initialisation.  On target this relies on
    /// [`NvsStore::new`] having run once already.
    fn default() -> Self {
        Self {
            namespace: NAMESPACE,
            #[cfg(not(target_os = "espidf"))]
            values: HashMap::new(),
        }
    }
}

impl NvsStore {
    /// Initialise NVS flash and open the light namespace.
    ///
    /// On a full partition or a version mismatch the partition is erased and
    /// re-initialised.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the single main-task context before any
            // other NVS user exists.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NvsStore: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(StorageError::IoError);
            }
            info!("NvsStore: ESP-IDF NVS initialised (ns={})", NAMESPACE);
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsStore: simulation backend (ns={})", NAMESPACE);

        Ok(Self::default())
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// NUL-terminated copy of `s`, truncated to the NVS limit.
    #[cfg(target_os = "espidf")]
    fn c_name(s: &str) -> [u8; NVS_KEY_BUF] {
        let mut buf = [0u8; NVS_KEY_BUF];
        let bytes = s.as_bytes();
        let len = bytes.len().min(NVS_KEY_BUF - 1);
        buf[..len].copy_from_slice(&bytes[..len]);
        buf
    }

    /// Open the namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(&self, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(self.namespace);
        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: `ns` is NUL-terminated and outlives the call.
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        // SAFETY: handle was opened above and is not used afterwards.
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

impl StoragePort for NvsStore {
    fn get_u16(&self, key: &str) -> Result<u16, StorageError> {
        debug_assert!(key.len() < NVS_KEY_BUF, "NVS key too long: {key}");

        #[cfg(not(target_os = "espidf"))]
        {
            self.values.get(key).copied().ok_or(StorageError::NotFound)
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_name(key);
            let result = self.with_nvs_handle(false, |handle| {
                let mut value: u16 = 0;
                // SAFETY: `k` is NUL-terminated; `value` is a valid out-pointer.
                let ret = unsafe { nvs_get_u16(handle, k.as_ptr().cast(), &mut value) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(value)
            });
            match result {
                Ok(v) => Ok(v),
                // A namespace that was never written cannot be opened read-only.
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => Err(StorageError::NotFound),
                Err(_) => Err(StorageError::IoError),
            }
        }
    }

    fn set_u16(&mut self, key: &str, value: u16) -> Result<(), StorageError> {
        debug_assert!(key.len() < NVS_KEY_BUF, "NVS key too long: {key}");

        #[cfg(not(target_os = "espidf"))]
        {
            self.values.insert(key.to_owned(), value);
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let k = Self::c_name(key);
            let result = self.with_nvs_handle(true, |handle| {
                // SAFETY: `k` is NUL-terminated; handle is open read-write.
                let ret = unsafe { nvs_set_u16(handle, k.as_ptr().cast(), value) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            result.map_err(|e| {
                if e == ESP_ERR_NVS_NOT_ENOUGH_SPACE {
                    StorageError::Full
                } else {
                    StorageError::IoError
                }
            })
        }
    }
}
