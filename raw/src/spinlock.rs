//! Busy-waiting spinlocks.
//!
//! A spinlock acquires by polling the [`AtomicFlag`] and setting it in the
//! same atomic read-modify-write operation. The waiting thread never
//! suspends; it stays runnable and burns CPU while the lock is contended,
//! yielding the processor between attempts so the holder gets a chance to
//! run.
//!
//! Use a spinlock only for very short critical sections under low
//! contention. The trade-off is wasted cycles under contention against the
//! avoided cost of parking and unparking when the lock is held briefly.
//!
//! Two flavours live here:
//!
//! - [`RawSpinLock`] guards nothing but itself: `lock()`/`unlock()`.
//! - [`SpinLock`] carries the data it protects, handed out through a
//!   [`SpinLockGuard`] that must be released explicitly.

use crate::atomic::{AtomicFlag, FlagState};
use crate::lock::RawLock;
use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
};
use crossbeam_utils::Backoff;

/// The lock could not be acquired at this time because the operation would
/// otherwise block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WouldBlock;

impl core::fmt::Display for WouldBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("operation would block")
    }
}

impl std::error::Error for WouldBlock {}

/// A busy-wait mutual exclusion lock with no data attached.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep_raw::RawSpinLock;
///
/// let lock = Arc::new(RawSpinLock::new());
/// let c_lock = Arc::clone(&lock);
///
/// std::thread::spawn(move || {
///     c_lock.lock();
///     // Critical section.
///     c_lock.unlock();
/// }).join().unwrap();
///
/// assert!(lock.try_lock());
/// lock.unlock();
/// ```
#[derive(Debug, Default)]
pub struct RawSpinLock {
    flag: AtomicFlag,
}

impl RawSpinLock {
    /// Creates a new spinlock in the free state.
    #[inline]
    pub fn new() -> Self {
        Self {
            flag: AtomicFlag::new(FlagState::Free),
        }
    }

    /// Acquires the lock, spinning until it is available.
    ///
    /// The exact behavior on locking a spinlock in the thread which already
    /// holds it is a deadlock: the lock is not reentrant.
    pub fn lock(&self) {
        let backoff = Backoff::new();
        while self
            .flag
            .compare_exchange(FlagState::Free, FlagState::Held)
            .is_err()
        {
            // Poll with plain loads so that waiters do not keep stealing the
            // cache line from the holder.
            while self.is_locked() {
                backoff.snooze();
            }
        }
    }

    /// Attempts to acquire the lock without spinning.
    ///
    /// Returns `true` if the lock was acquired.
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.flag
            .compare_exchange(FlagState::Free, FlagState::Held)
            .is_ok()
    }

    /// Releases the lock.
    ///
    /// # Panics
    /// Panics if the lock is not held.
    #[inline]
    pub fn unlock(&self) {
        if self.flag.swap(FlagState::Free) == FlagState::Free {
            panic!("RawSpinLock::unlock called on a lock that is not held.");
        }
    }

    /// Returns whether the lock is currently held by someone.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flag.load() == FlagState::Held
    }
}

impl RawLock for RawSpinLock {
    fn lock(&self) {
        RawSpinLock::lock(self)
    }

    fn try_lock(&self) -> bool {
        RawSpinLock::try_lock(self)
    }

    fn unlock(&self) {
        RawSpinLock::unlock(self)
    }
}

/// A mutual exclusion primitive useful for protecting shared data
///
/// This spinlock will spin threads waiting for the lock to become available.
/// Each spinlock has a type parameter which represents the data that it is
/// protecting. The data can only be accessed through the guards returned from
/// [`lock`] and [`try_lock`], which guarantees that the data is only ever
/// accessed when the spinlock is locked.
///
/// [`lock`]: Self::lock
/// [`try_lock`]: Self::try_lock
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep_raw::SpinLock;
///
/// const N: usize = 10;
///
/// let data = Arc::new(SpinLock::new(0));
/// let handles: Vec<_> = (0..N)
///     .map(|_| {
///         let data = Arc::clone(&data);
///         std::thread::spawn(move || {
///             let mut guard = data.lock();
///             *guard += 1;
///             // the lock must be "explicitly" unlocked.
///             guard.unlock();
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(Arc::try_unwrap(data).ok().unwrap().into_inner(), N);
/// ```
pub struct SpinLock<T: ?Sized> {
    raw: RawSpinLock,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for SpinLock<T> {}
unsafe impl<T: ?Sized + Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Creates a new spinlock in an unlocked state ready for use.
    #[inline]
    pub fn new(t: T) -> SpinLock<T> {
        SpinLock {
            raw: RawSpinLock::new(),
            data: UnsafeCell::new(t),
        }
    }

    /// Consumes this spinlock, returning the underlying data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> SpinLock<T> {
    /// Acquires a spinlock, spinning until it is able to do so.
    ///
    /// Upon returning, the thread is the only thread with the lock held. The
    /// returned guard must be released with [`SpinLockGuard::unlock`].
    #[track_caller]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.raw.lock();
        SpinLockGuard {
            caller: core::panic::Location::caller(),
            lock: self,
        }
    }

    /// Attempts to acquire this lock.
    ///
    /// This function does not spin.
    ///
    /// # Errors
    ///
    /// If the spinlock could not be acquired because it is already locked, then
    /// this call will return the [`WouldBlock`] error.
    #[track_caller]
    pub fn try_lock(&self) -> Result<SpinLockGuard<'_, T>, WouldBlock> {
        if self.raw.try_lock() {
            Ok(SpinLockGuard {
                caller: core::panic::Location::caller(),
                lock: self,
            })
        } else {
            Err(WouldBlock)
        }
    }
}

impl<T: Default> Default for SpinLock<T> {
    /// Creates a `SpinLock<T>`, with the `Default` value for T.
    fn default() -> SpinLock<T> {
        SpinLock::new(Default::default())
    }
}

/// An implementation of a "scoped lock" of a spinlock. When this structure
/// is dropped (falls out of scope) without unlock, panic occurs.
///
/// The lock must be explicitly unlocked by [`unlock`] method.
///
/// [`unlock`]: Self::unlock
pub struct SpinLockGuard<'a, T: ?Sized + 'a> {
    caller: &'static core::panic::Location<'static>,
    lock: &'a SpinLock<T>,
}

unsafe impl<T: ?Sized + Sync> Sync for SpinLockGuard<'_, T> {}

impl<T: ?Sized> SpinLockGuard<'_, T> {
    /// Releases the underlying [`SpinLock`].
    ///
    /// As the guard does **not** automatically release the lock on drop,
    /// the caller must explicitly invoke [`unlock`] to mark the lock
    /// as available again.
    ///
    /// [`unlock`]: Self::unlock
    pub fn unlock(self) {
        self.lock.raw.unlock();
        core::mem::forget(self);
    }
}

impl<T: ?Sized> Deref for SpinLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for SpinLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for SpinLockGuard<'_, T> {
    fn drop(&mut self) {
        // Releasing during unwinding keeps the lock usable without turning one
        // panic into an abort.
        self.lock.raw.unlock();
        if !std::thread::panicking() {
            panic!(
                "`.unlock()` must be explicitly called before dropping SpinLockGuard.
The lock is held at {:?}.",
                self.caller
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn try_lock_fails_while_held() {
        let lock = RawSpinLock::new();
        lock.lock();
        assert!(lock.is_locked());
        assert!(!lock.try_lock());
        lock.unlock();
        assert!(lock.try_lock());
        lock.unlock();
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn unlock_without_lock_panics() {
        RawSpinLock::new().unlock();
    }

    #[test]
    #[should_panic(expected = "must be explicitly called")]
    fn dropping_guard_panics() {
        let lock = SpinLock::new(0);
        let _guard = lock.lock();
    }

    #[test]
    fn try_lock_on_data_lock() {
        let lock = SpinLock::new(1);
        let guard = lock.lock();
        assert_eq!(lock.try_lock().err(), Some(WouldBlock));
        guard.unlock();
        let mut guard = lock.try_lock().unwrap();
        *guard += 1;
        guard.unlock();
        assert_eq!(lock.into_inner(), 2);
    }

    #[test]
    fn mutual_exclusion() {
        const THREADS: usize = 8;
        const ITERS: usize = 1000;
        let lock = Arc::new(RawSpinLock::new());
        let inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let (lock, inside) = (lock.clone(), inside.clone());
                std::thread::spawn(move || {
                    for _ in 0..ITERS {
                        lock.lock();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        lock.unlock();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(!lock.is_locked());
    }
}
