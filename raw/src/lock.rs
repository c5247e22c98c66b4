//! The mutual-exclusion interface.
//!
//! Busy-waiting and blocking suspension are two strategies for the same
//! contract. They are kept as separate types implementing one trait so a
//! caller picks one deliberately, based on the expected hold time and
//! contention:
//!
//! |                | [`RawSpinLock`]           | `lockstep::sync::RawMutex` |
//! |----------------|---------------------------|----------------------------|
//! | Waiting thread | Spins (busy-waits)        | Parks                      |
//! | CPU usage      | High under contention     | Low (no busy waiting)      |
//! | Overhead       | Low when held briefly     | Higher (park/unpark)       |
//!
//! [`RawSpinLock`]: crate::RawSpinLock

/// A lock that grants exclusive access to at most one holder at a time.
///
/// The lock does not track *which* task holds it: any task may release a
/// held lock. Releasing a lock that is not held is a contract violation and
/// panics.
pub trait RawLock: Send + Sync {
    /// Acquires the lock, waiting until it is available.
    fn lock(&self);

    /// Attempts to acquire the lock without waiting.
    ///
    /// Returns `true` if the lock was acquired.
    fn try_lock(&self) -> bool;

    /// Releases the lock.
    ///
    /// # Panics
    /// Panics if the lock is not held.
    fn unlock(&self);

    /// Runs `f` while holding the lock.
    fn with<R>(&self, f: impl FnOnce() -> R) -> R
    where
        Self: Sized,
    {
        self.lock();
        let r = f();
        self.unlock();
        r
    }
}
