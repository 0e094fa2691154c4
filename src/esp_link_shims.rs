//! `critical-section` provider for ESP-IDF builds.
//!
//! `embassy-sync` guards the duty queues with `CriticalSectionRawMutex`,
//! which needs exactly one `critical_section::Impl` linked in.  Here it is
//! backed by a process-wide std mutex, re-entrant per thread.  Host test
//! builds get theirs from `critical-section`'s `std` feature instead.

use core::cell::{Cell, RefCell};
use std::sync::{Mutex, MutexGuard, PoisonError};

use critical_section::RawRestoreState;

static CS_MUTEX: Mutex<()> = Mutex::new(());

thread_local! {
    static CS_DEPTH: Cell<u8> = const { Cell::new(0) };
    static CS_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

struct StdCriticalSection;
critical_section::set_impl!(StdCriticalSection);

// SAFETY: every acquire on a thread is paired with a release on the same
// thread; the outermost pair holds the global mutex.
unsafe impl critical_section::Impl for StdCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let depth = CS_DEPTH.get();
        if depth == 0 {
            let guard = CS_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
            CS_GUARD.with_borrow_mut(|slot| *slot = Some(guard));
        }
        CS_DEPTH.set(depth.saturating_add(1));
    }

    unsafe fn release(_restore: RawRestoreState) {
        let depth = CS_DEPTH.get();
        if depth == 0 {
            return;
        }
        CS_DEPTH.set(depth - 1);
        if depth == 1 {
            CS_GUARD.with_borrow_mut(|slot| *slot = None);
        }
    }
}
