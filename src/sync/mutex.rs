//! # Mutex.
//!
//! Mutex is a synchronization primitive that allows **only one thread at a
//! time** to access a critical section of code. Unlike the spin lock, it
//! **parks** threads trying to acquire it while another thread holds the
//! lock, so waiters consume no CPU.
//!
//! The [`RawMutex`] keeps its state (held or not, plus the list of parked
//! threads) behind a [`SpinLock`]. The spinlock is only ever held for O(1)
//! bookkeeping. A thread that finds the mutex held publishes its
//! [`ParkHandle`] into the waiter list and releases the spinlock inside
//! [`Current::park_with`], so a concurrent release either sees the handle or
//! happened before the check. When unlocking, one waiting thread is woken;
//! it then competes for the lock again.
//!
//! The raw mutex is not owned by a thread: any thread may release a held
//! [`RawMutex`]. The reader-preferring rwlock relies on this, as its last
//! reader releases the lock its first reader took.

use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
};
use lockstep_raw::{Current, ParkHandle, RawLock, SpinLock, WouldBlock};
use std::collections::VecDeque;

#[derive(Default)]
struct MutexState {
    held: bool,
    waiters: VecDeque<ParkHandle>,
}

/// A blocking mutual exclusion lock with no data attached.
#[derive(Default)]
pub struct RawMutex {
    state: SpinLock<MutexState>,
}

impl RawMutex {
    /// Creates a new mutex in an unlocked state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the mutex, parking the current thread until it is able to do
    /// so.
    ///
    /// Locking the mutex again from the thread which holds it deadlocks.
    pub fn acquire(&self) {
        loop {
            let mut state = self.state.lock();
            if !state.held {
                state.held = true;
                state.unlock();
                return;
            }
            Current::park_with(move |handle| {
                state.waiters.push_back(handle);
                state.unlock();
            });
        }
    }

    /// Attempts to acquire the mutex without blocking.
    ///
    /// Returns `true` if the mutex was acquired.
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        let acquired = !state.held;
        state.held = true;
        state.unlock();
        acquired
    }

    /// Releases the mutex and wakes one parked thread, if any.
    ///
    /// # Panics
    /// Panics if the mutex is not held.
    pub fn release(&self) {
        let mut state = self.state.lock();
        if !state.held {
            state.unlock();
            panic!("RawMutex::release called on a mutex that is not held.");
        }
        state.held = false;
        let waiter = state.waiters.pop_front();
        state.unlock();
        if let Some(waiter) = waiter {
            waiter.unpark();
        }
    }
}

impl RawLock for RawMutex {
    fn lock(&self) {
        self.acquire()
    }

    fn try_lock(&self) -> bool {
        self.try_acquire()
    }

    fn unlock(&self) {
        self.release()
    }
}

/// A mutual exclusion primitive useful for protecting shared data
///
/// This mutex will block threads waiting for the lock to become available.
/// Each mutex has a type parameter which represents the data that it is
/// protecting. The data can only be accessed through the guards returned from
/// [`lock`] and [`try_lock`], which guarantees that the data is only ever
/// accessed when the mutex is locked.
///
/// [`lock`]: Self::lock
/// [`try_lock`]: Self::try_lock
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep::sync::Mutex;
///
/// const N: usize = 10;
///
/// let data = Arc::new(Mutex::new(0));
/// let handles: Vec<_> = (0..N)
///     .map(|_| {
///         let data = Arc::clone(&data);
///         std::thread::spawn(move || {
///             let mut data = data.lock();
///             *data += 1;
///             // the lock must be "explicitly" unlocked.
///             data.unlock();
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// let data = data.lock();
/// assert_eq!(*data, N);
/// data.unlock();
/// ```
pub struct Mutex<T: ?Sized> {
    raw: RawMutex,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for Mutex<T> {}
unsafe impl<T: ?Sized + Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Creates a new mutex in an unlocked state ready for use.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockstep::sync::Mutex;
    ///
    /// let mutex = Mutex::new(0);
    /// ```
    #[inline]
    pub fn new(t: T) -> Mutex<T> {
        Mutex {
            raw: RawMutex::new(),
            data: UnsafeCell::new(t),
        }
    }

    /// Consumes this mutex, returning the underlying data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Acquires a mutex, blocking the current thread until it is able to do
    /// so.
    ///
    /// Upon returning, the thread is the only thread with the lock held. The
    /// returned guard must be released with [`MutexGuard::unlock`], or handed
    /// to [`ConditionVariable::signal`] / [`ConditionVariable::broadcast`].
    ///
    /// [`ConditionVariable::signal`]: crate::sync::ConditionVariable::signal
    /// [`ConditionVariable::broadcast`]: crate::sync::ConditionVariable::broadcast
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.raw.acquire();
        MutexGuard { lock: self }
    }

    /// Attempts to acquire this lock.
    ///
    /// This function does not block.
    ///
    /// # Errors
    ///
    /// If the mutex could not be acquired because it is already locked, then
    /// this call will return the [`WouldBlock`] error.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, T>, WouldBlock> {
        if self.raw.try_acquire() {
            Ok(MutexGuard { lock: self })
        } else {
            Err(WouldBlock)
        }
    }
}

impl<T: Default> Default for Mutex<T> {
    /// Creates a `Mutex<T>`, with the `Default` value for T.
    fn default() -> Mutex<T> {
        Mutex::new(Default::default())
    }
}

/// An implementation of a "scoped lock" of a mutex. When this structure
/// is dropped (falls out of scope) without unlocking, the panic occurs.
///
/// The lock must be explicitly unlocked by [`unlock`] method.
///
/// The data protected by the mutex can be accessed through this guard.
///
/// [`unlock`]: MutexGuard::unlock
pub struct MutexGuard<'a, T: ?Sized + 'a> {
    lock: &'a Mutex<T>,
}

unsafe impl<T: ?Sized + Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T: ?Sized> MutexGuard<'a, T> {
    /// Releases the underlying [`Mutex`].
    ///
    /// As the guard does **not** automatically release the lock on drop,
    /// the caller must explicitly invoke [`unlock`] to mark the lock
    /// as available again.
    ///
    /// [`unlock`]: MutexGuard::unlock
    pub fn unlock(self) {
        self.lock.raw.release();
        core::mem::forget(self);
    }

    pub(crate) fn mutex(&self) -> &'a Mutex<T> {
        self.lock
    }
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.release();
        if !std::thread::panicking() {
            panic!("`.unlock()` must be explicitly called for MutexGuard.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn try_acquire_reports_held() {
        let mutex = RawMutex::new();
        assert!(mutex.try_acquire());
        assert!(!mutex.try_acquire());
        mutex.release();
        assert!(mutex.try_acquire());
        mutex.release();
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn release_without_acquire_panics() {
        RawMutex::new().release();
    }

    #[test]
    #[should_panic(expected = "must be explicitly called")]
    fn dropping_guard_panics() {
        let mutex = Mutex::new(());
        let _guard = mutex.lock();
    }

    #[test]
    fn guard_is_released_while_unwinding() {
        let mutex = Arc::new(Mutex::new(0));
        let result = {
            let mutex = mutex.clone();
            std::thread::spawn(move || {
                let _guard = mutex.lock();
                panic!("boom");
            })
            .join()
        };
        assert!(result.is_err());
        let guard = mutex.try_lock().unwrap();
        guard.unlock();
    }

    #[test]
    fn released_by_another_thread() {
        let mutex = Arc::new(RawMutex::new());
        mutex.acquire();
        let releaser = {
            let mutex = mutex.clone();
            std::thread::spawn(move || mutex.release())
        };
        releaser.join().unwrap();
        assert!(mutex.try_acquire());
        mutex.release();
    }

    #[test]
    fn waiter_is_woken_on_release() {
        let mutex = Arc::new(Mutex::new(0));
        let guard = mutex.lock();
        let entered = Arc::new(AtomicBool::new(false));

        let waiter = {
            let (mutex, entered) = (mutex.clone(), entered.clone());
            std::thread::spawn(move || {
                entered.store(true, Ordering::SeqCst);
                let mut guard = mutex.lock();
                *guard += 1;
                guard.unlock();
            })
        };

        while !entered.load(Ordering::SeqCst) {
            core::hint::spin_loop();
        }
        guard.unlock();
        waiter.join().unwrap();
        assert_eq!(Arc::try_unwrap(mutex).ok().unwrap().into_inner(), 1);
    }
}
