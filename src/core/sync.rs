//! Lock helpers
//!
//! Two policies are used across the crate:
//! - [`handle_mutex_poison`] turns a poisoned lock into a domain error. The
//!   service tracker uses it because its state can be left half-updated by a
//!   panicking customizer.
//! - [`recover_read`] / [`recover_write`] / [`recover_lock`] take the guard out
//!   of a poisoned lock. The registry and bundle tables use them: every
//!   critical section there is a single push/remove/clone that cannot be
//!   interrupted half way, and user code never runs while they are held.

use std::sync::{LockResult, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Convert a poisoned lock result into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use bundlekit::core::sync::handle_mutex_poison;
/// use bundlekit::framework::api::FrameworkError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(
///     mutex.lock(),
///     |message| FrameworkError::Synchronisation { message },
/// ).unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (lock poisoned). A panic occurred while holding the lock: {:?}",
            poison_err
        ))
    })
}

/// Acquire a mutex, recovering the guard if a previous holder panicked
pub fn recover_lock<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned mutex");
        poisoned.into_inner()
    })
}

/// Read-lock an RwLock, recovering the guard if a writer panicked
pub fn recover_read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned RwLock (read)");
        poisoned.into_inner()
    })
}

/// Write-lock an RwLock, recovering the guard if a holder panicked
pub fn recover_write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned RwLock (write)");
        poisoned.into_inner()
    })
}
