use alloc::sync::Arc;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Type alias for a [`RwLock`] wrapped in an [`Arc`].
pub type RwArc<T> = Arc<RwLock<T>>;

/// Acquire a [`Mutex`], panicking if it was poisoned.
pub trait LockExt<T> {
    fn acquire(&self) -> MutexGuard<'_, T>;
}

impl<T> LockExt<T> for Mutex<T> {
    fn acquire(&self) -> MutexGuard<'_, T> {
        self.lock().expect("poisoned lock")
    }
}

/// Acquire a [`RwLock`] for reading or writing, panicking if it was poisoned.
pub trait RwLockExt<T> {
    fn new_lock(val: T) -> Self;

    fn acquire_read(&self) -> RwLockReadGuard<'_, T>;

    fn acquire_write(&self) -> RwLockWriteGuard<'_, T>;
}

impl<T> RwLockExt<T> for RwArc<T> {
    fn new_lock(val: T) -> Self {
        Arc::new(RwLock::new(val))
    }

    fn acquire_read(&self) -> RwLockReadGuard<'_, T> {
        self.read().expect("poisoned lock")
    }

    fn acquire_write(&self) -> RwLockWriteGuard<'_, T> {
        self.write().expect("poisoned lock")
    }
}
