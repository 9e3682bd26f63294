//! Lock acquisition that survives poisoning.
//!
//! A published generation is replaced whole, so a panic while holding a lock
//! can never leave a half-written value behind. Recovering is always safe.

use std::sync::{LockResult, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    recover(lock.read(), "rwlock.read", target, op)
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    target: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    recover(lock.write(), "rwlock.write", target, op)
}

pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    recover(lock.lock(), "mutex.lock", target, op)
}

fn recover<G>(
    result: LockResult<G>,
    lock_kind: &'static str,
    target: &'static str,
    op: &'static str,
) -> G {
    result.unwrap_or_else(|poisoned| {
        warn!(
            op,
            target_module = target,
            lock_kind,
            result = "poisoned_recovered",
            "Recovered from poisoned lock"
        );
        poisoned.into_inner()
    })
}
