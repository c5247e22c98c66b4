//! # Reader-writer locks.
//!
//! A reader-writer lock allows a number of readers or at most one writer at
//! any point in time, never both. Which side waits when both want in is a
//! *policy*, and two policies are provided:
//!
//! | Policy                  | Who may starve | Built on                           |
//! |-------------------------|----------------|------------------------------------|
//! | [`ReaderPreferring`]    | Writers        | reader-count mutex + global mutex  |
//! | [`WriterPreferring`]    | Nobody*        | one mutex + one condition variable |
//!
//! \* as long as writers arrive at a bounded rate; readers may queue behind
//! writers.
//!
//! Both implement [`RawRwLock`]. [`PolicyLock`] picks one at runtime, and
//! [`RwLock`] wraps a value behind a [`PolicyLock`] and hands out RAII
//! guards.

mod reader_preferring;
mod writer_preferring;

pub use reader_preferring::ReaderPreferring;
pub use writer_preferring::WriterPreferring;

use core::{
    cell::UnsafeCell,
    ops::{Deref, DerefMut},
};
use lockstep_raw::WouldBlock;

/// The raw reader-writer lock interface.
///
/// Unlocking a side that is not held is a contract violation and panics.
pub trait RawRwLock: Send + Sync {
    /// Acquires shared read access, blocking while it cannot be granted.
    fn read_lock(&self);

    /// Attempts to acquire shared read access without blocking.
    fn try_read_lock(&self) -> bool;

    /// Releases shared read access.
    fn read_unlock(&self);

    /// Acquires exclusive write access, blocking while it cannot be granted.
    fn write_lock(&self);

    /// Attempts to acquire exclusive write access without blocking.
    fn try_write_lock(&self) -> bool;

    /// Releases exclusive write access.
    fn write_unlock(&self);
}

/// Starvation policy of a reader-writer lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// See [`ReaderPreferring`].
    ReaderPreferring,
    /// See [`WriterPreferring`].
    WriterPreferring,
}

/// A raw reader-writer lock whose policy is chosen at construction.
pub enum PolicyLock {
    /// A reader-preferring lock.
    ReaderPreferring(ReaderPreferring),
    /// A writer-preferring lock.
    WriterPreferring(WriterPreferring),
}

impl PolicyLock {
    /// Creates a free lock following `policy`.
    pub fn new(policy: Policy) -> Self {
        match policy {
            Policy::ReaderPreferring => Self::ReaderPreferring(ReaderPreferring::new()),
            Policy::WriterPreferring => Self::WriterPreferring(WriterPreferring::new()),
        }
    }

    /// The policy this lock follows.
    pub fn policy(&self) -> Policy {
        match self {
            Self::ReaderPreferring(_) => Policy::ReaderPreferring,
            Self::WriterPreferring(_) => Policy::WriterPreferring,
        }
    }

    fn raw(&self) -> &dyn RawRwLock {
        match self {
            Self::ReaderPreferring(lock) => lock,
            Self::WriterPreferring(lock) => lock,
        }
    }
}

impl RawRwLock for PolicyLock {
    fn read_lock(&self) {
        self.raw().read_lock()
    }

    fn try_read_lock(&self) -> bool {
        self.raw().try_read_lock()
    }

    fn read_unlock(&self) {
        self.raw().read_unlock()
    }

    fn write_lock(&self) {
        self.raw().write_lock()
    }

    fn try_write_lock(&self) -> bool {
        self.raw().try_write_lock()
    }

    fn write_unlock(&self) {
        self.raw().write_unlock()
    }
}

/// A reader-writer lock protecting a value.
///
/// The type parameter `T` represents the data that this lock protects. It is
/// required that `T` satisfies [`Send`] to be shared across threads and
/// [`Sync`] to allow concurrent access through readers. The RAII guards
/// returned from the locking methods implement [`Deref`] (and [`DerefMut`]
/// for the `write` methods) to allow access to the content of the lock, and
/// release their access when dropped.
///
/// # Examples
///
/// ```
/// use lockstep::sync::{Policy, RwLock};
///
/// let lock = RwLock::new(Policy::WriterPreferring, 5);
/// {
///     let r1 = lock.read();
///     let r2 = lock.read();
///     assert_eq!(*r1 + *r2, 10);
///     assert!(lock.try_write().is_err());
/// }
/// *lock.write() += 1;
/// assert_eq!(lock.into_inner(), 6);
/// ```
pub struct RwLock<T: ?Sized> {
    raw: PolicyLock,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for RwLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for RwLock<T> {}

impl<T> RwLock<T> {
    /// Creates a new instance of an `RwLock<T>` which is unlocked.
    pub fn new(policy: Policy, data: T) -> RwLock<T> {
        RwLock {
            raw: PolicyLock::new(policy),
            data: UnsafeCell::new(data),
        }
    }

    /// Consumes this RwLock, returning the underlying data.
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> RwLock<T> {
    /// The policy this lock follows.
    pub fn policy(&self) -> Policy {
        self.raw.policy()
    }

    /// Locks this rwlock with shared read access, blocking the current thread
    /// until it can be acquired.
    ///
    /// There may be other readers currently inside the lock when this method
    /// returns.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.raw.read_lock();
        RwLockReadGuard {
            lock: self,
            data: unsafe { &*self.data.get() },
        }
    }

    /// Attempts to acquire this rwlock with shared read access.
    ///
    /// # Errors
    /// Returns [`WouldBlock`] if the access could not be granted at this time.
    pub fn try_read(&self) -> Result<RwLockReadGuard<'_, T>, WouldBlock> {
        if self.raw.try_read_lock() {
            Ok(RwLockReadGuard {
                lock: self,
                data: unsafe { &*self.data.get() },
            })
        } else {
            Err(WouldBlock)
        }
    }

    /// Locks this rwlock with exclusive write access, blocking the current
    /// thread until it can be acquired.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.raw.write_lock();
        RwLockWriteGuard {
            lock: self,
            data: unsafe { &mut *self.data.get() },
        }
    }

    /// Attempts to lock this rwlock with exclusive write access.
    ///
    /// # Errors
    /// Returns [`WouldBlock`] if the lock could not be acquired at this time.
    pub fn try_write(&self) -> Result<RwLockWriteGuard<'_, T>, WouldBlock> {
        if self.raw.try_write_lock() {
            Ok(RwLockWriteGuard {
                lock: self,
                data: unsafe { &mut *self.data.get() },
            })
        } else {
            Err(WouldBlock)
        }
    }
}

impl<T: ?Sized> core::fmt::Debug for RwLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("RwLock")
            .field("policy", &self.policy())
            .finish_non_exhaustive()
    }
}

/// RAII structure used to release the shared read access of a lock when
/// dropped.
///
/// This structure is created by the [`read`] and [`try_read`] methods on
/// [`RwLock`].
///
/// [`read`]: RwLock::read
/// [`try_read`]: RwLock::try_read
pub struct RwLockReadGuard<'a, T: ?Sized + 'a> {
    lock: &'a RwLock<T>,
    data: &'a T,
}

/// RAII structure used to release the exclusive write access of a lock when
/// dropped.
///
/// This structure is created by the [`write`] and [`try_write`] methods
/// on [`RwLock`].
///
/// [`write`]: RwLock::write
/// [`try_write`]: RwLock::try_write
pub struct RwLockWriteGuard<'a, T: ?Sized + 'a> {
    lock: &'a RwLock<T>,
    data: &'a mut T,
}

impl<T: ?Sized> Deref for RwLockReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.data
    }
}

impl<T: ?Sized> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &*self.data
    }
}

impl<T: ?Sized> DerefMut for RwLockWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut *self.data
    }
}

impl<T: ?Sized> Drop for RwLockReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.read_unlock();
    }
}

impl<T: ?Sized> Drop for RwLockWriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.raw.write_unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_is_reported() {
        for policy in [Policy::ReaderPreferring, Policy::WriterPreferring] {
            assert_eq!(PolicyLock::new(policy).policy(), policy);
            assert_eq!(RwLock::new(policy, ()).policy(), policy);
        }
    }

    #[test]
    fn guards_exclude_each_other() {
        for policy in [Policy::ReaderPreferring, Policy::WriterPreferring] {
            let lock = RwLock::new(policy, 0);
            let reader = lock.read();
            assert!(lock.try_read().is_ok());
            assert!(lock.try_write().is_err());
            drop(reader);

            let mut writer = lock.write();
            *writer = 42;
            assert!(lock.try_read().is_err());
            assert!(lock.try_write().is_err());
            drop(writer);

            assert_eq!(*lock.read(), 42);
        }
    }

    #[test]
    #[should_panic(expected = "without a matching read_lock")]
    fn unmatched_read_unlock_panics() {
        PolicyLock::new(Policy::ReaderPreferring).read_unlock();
    }

    #[test]
    #[should_panic(expected = "without a matching write_lock")]
    fn unmatched_write_unlock_panics() {
        PolicyLock::new(Policy::ReaderPreferring).write_unlock();
    }

    #[test]
    fn write_unlock_under_readers_keeps_writers_out() {
        let lock = ReaderPreferring::new();
        lock.read_lock();
        let stray =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| lock.write_unlock()));
        assert!(stray.is_err());
        assert!(!lock.try_write_lock());
        lock.read_unlock();
        assert!(lock.try_write_lock());
        lock.write_unlock();
    }
}
