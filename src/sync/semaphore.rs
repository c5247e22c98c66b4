//! # Semaphore.
//!
//! A **semaphore** regulates concurrent access to a finite set of resources.
//! It maintains an internal count of available "permits"; each permit grants
//! a thread the right to proceed. A semaphore with one permit behaves like a
//! mutex, and a semaphore initialized with zero permits serves as an event
//! signal from one thread to another.
//!
//! The [`Semaphore`] here is a mutex-protected counter plus a condition
//! variable:
//!
//! - [`Semaphore::acquire`] waits while no permit is available, then takes
//!   one.
//! - [`Semaphore::release`] returns one permit and wakes **one** waiter.
//!   Every acquirer needs exactly one permit, so waiters are interchangeable
//!   and a single wakeup can never be wasted on a thread that still cannot
//!   proceed.
//! - [`Semaphore::access`] hands out a [`SemaphorePermit`] that releases on
//!   drop.
//!
//! For claims of more than one permit at a time, see
//! [`WeightedSemaphore`](crate::sync::WeightedSemaphore).

use super::{condition_variable::ConditionVariable, mutex::Mutex};

/// Counting semaphore.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep::sync::Semaphore;
///
/// let ready = Arc::new(Semaphore::new(0));
/// let worker = {
///     let ready = ready.clone();
///     std::thread::spawn(move || ready.release())
/// };
/// // Blocks until the worker signals.
/// ready.acquire();
/// worker.join().unwrap();
/// ```
pub struct Semaphore {
    permits: Mutex<usize>,
    available: ConditionVariable,
}

impl Semaphore {
    /// Creates a new semaphore initialized with `permits` available permits.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: ConditionVariable::new(),
        }
    }

    /// Waits until a permit becomes available and then acquires it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            log::trace!("semaphore: no permit available, parking");
            permits = self.available.wait(permits);
        }
        *permits -= 1;
        permits.unlock();
    }

    /// Acquires a permit if one is available, without blocking.
    ///
    /// Returns `true` if a permit was taken.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        let acquired = *permits > 0;
        if acquired {
            *permits -= 1;
        }
        permits.unlock();
        acquired
    }

    /// Releases a permit back to the semaphore.
    ///
    /// This increases the number of available permits by one and, if any
    /// threads are blocked in [`acquire`], wakes one of them.
    ///
    /// [`acquire`]: Semaphore::acquire
    pub fn release(&self) {
        let mut permits = self.permits.lock();
        *permits += 1;
        self.available.signal(permits);
    }

    /// Acquires a permit and returns it as an RAII guard.
    ///
    /// The permit is released when the guard is dropped.
    pub fn access(&self) -> SemaphorePermit<'_> {
        self.acquire();
        SemaphorePermit { sema: self }
    }
}

/// An RAII implementation of a held permit. When this structure is dropped
/// (falls out of scope), the semaphore is released.
///
/// This structure is created by the [`access`] method on [`Semaphore`].
///
/// [`access`]: Semaphore::access
pub struct SemaphorePermit<'a> {
    sema: &'a Semaphore,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        self.sema.release()
    }
}
