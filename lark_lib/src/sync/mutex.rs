//! Mutual exclusion with a build-dependent backend.
//!
//! Bare-metal builds use the crate's [`SpinLock`]; the `std` feature swaps
//! in `parking_lot` so host-side tests block instead of spinning. Driver
//! state that lives in a `static` relies on `Mutex::new` being `const` in
//! both configurations.
//!
//! [`SpinLock`]: super::spinlock::SpinLock

use core::ops::{Deref, DerefMut};

#[cfg(not(feature = "std"))]
use super::spinlock::{SpinLock as Lock, SpinLockGuard as LockGuard};

#[cfg(feature = "std")]
use parking_lot::{Mutex as Lock, MutexGuard as LockGuard};

pub struct Mutex<T: Send> {
    inner: Lock<T>,
}

impl<T: Send> Mutex<T> {
    pub const fn new(v: T) -> Self {
        Mutex {
            inner: Lock::new(v),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        MutexGuard {
            inner: self.inner.lock(),
        }
    }
}

impl<T: Send + Default> Default for Mutex<T> {
    fn default() -> Self {
        Mutex::new(T::default())
    }
}

pub struct MutexGuard<'a, T: Send> {
    inner: LockGuard<'a, T>,
}

impl<T: Send> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Send> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COUNTER: Mutex<u32> = Mutex::new(0);

    #[test]
    fn static_mutex_round_trip() {
        let mut guard = COUNTER.lock();
        *guard += 1;
        assert!(*guard >= 1);
    }
}
