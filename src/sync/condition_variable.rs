//! # Condition Variable.
//!
//! A **Condition Variable** allows a thread to efficiently block until a
//! certain condition is met, without consuming CPU cycles. It is always used
//! in conjunction with a [`Mutex`] that guards access to shared data.
//!
//! Waiting and signalling both take the [`MutexGuard`], which enforces that
//! the calls are made with the mutex held:
//!
//! - [`ConditionVariable::wait`] atomically releases the mutex and parks the
//!   caller, then reacquires the mutex before returning.
//! - [`ConditionVariable::wait_while`] locks, checks a predicate and waits
//!   until the predicate is false.
//! - [`ConditionVariable::signal`] wakes **one** waiting thread and
//!   [`ConditionVariable::broadcast`] wakes **all** of them. Both consume the
//!   guard and release the mutex afterwards.
//!
//! A waiting thread enqueues its [`ParkHandle`] before it gives up the mutex,
//! so a signaller that mutated the state under the mutex always finds it.
//!
//! [`ParkHandle`]: lockstep_raw::ParkHandle

use super::mutex::{Mutex, MutexGuard};
use crossbeam_queue::SegQueue;
use lockstep_raw::{Current, ParkHandle};

/// A Condition Variable
///
/// Condition variables represent the ability to block a thread such that it
/// consumes no CPU time while waiting for an event to occur. Condition
/// variables are typically associated with a boolean predicate (a condition)
/// and a mutex. The predicate is always verified inside of the mutex before
/// determining that a thread must block.
///
/// Using more than one mutex with the same condition variable is a logic
/// error.
#[derive(Default)]
pub struct ConditionVariable {
    waiters: SegQueue<ParkHandle>,
}

impl ConditionVariable {
    /// Creates a new condition variable which is ready to be waited on and
    /// signaled.
    pub fn new() -> Self {
        Self {
            waiters: SegQueue::new(),
        }
    }

    /// Blocks the current thread until this condition variable receives a
    /// notification.
    ///
    /// The mutex behind `guard` is released while the thread sleeps and is
    /// reacquired before this function returns. The state must be re-checked
    /// by the caller: another thread may have changed it between the
    /// notification and the reacquisition.
    pub fn wait<'a, T: ?Sized>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        let mutex = guard.mutex();
        Current::park_with(|handle| {
            self.waiters.push(handle);
            guard.unlock();
        });
        mutex.lock()
    }

    /// Blocks the current thread while `predicate` returns `true`.
    ///
    /// This function locks `mutex` and checks the predicate. If it returns
    /// `true`, the thread is blocked and the mutex is temporarily released.
    /// When the thread is signaled and wakes up, it reacquires the mutex and
    /// re-evaluates the predicate. This loop continues until the predicate
    /// returns `false`, and the guard is returned with the mutex held.
    ///
    /// # Example
    /// ```
    /// use lockstep::sync::{ConditionVariable, Mutex};
    ///
    /// let (mutex, condvar) = (Mutex::new(1), ConditionVariable::new());
    /// let guard = condvar.wait_while(&mutex, |count| *count == 0);
    /// assert_eq!(*guard, 1);
    /// guard.unlock();
    /// ```
    pub fn wait_while<'a, T: ?Sized>(
        &self,
        mutex: &'a Mutex<T>,
        mut predicate: impl FnMut(&mut T) -> bool,
    ) -> MutexGuard<'a, T> {
        let mut guard = mutex.lock();
        while predicate(&mut *guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Wakes up one blocked thread on this condvar, then releases the mutex.
    ///
    /// Calls to `signal` are not buffered in any way: if nobody is waiting,
    /// the notification is lost.
    ///
    /// To wake up all threads, see [`broadcast`].
    ///
    /// [`broadcast`]: ConditionVariable::broadcast
    pub fn signal<T: ?Sized>(&self, guard: MutexGuard<'_, T>) {
        if let Some(waiter) = self.waiters.pop() {
            waiter.unpark();
        }
        guard.unlock();
    }

    /// Wakes up all blocked threads on this condvar, then releases the mutex.
    ///
    /// To wake up only one thread, see [`signal`].
    ///
    /// [`signal`]: ConditionVariable::signal
    pub fn broadcast<T: ?Sized>(&self, guard: MutexGuard<'_, T>) {
        // Only the threads that were waiting when the broadcast started.
        for _ in 0..self.waiters.len() {
            match self.waiters.pop() {
                Some(waiter) => waiter.unpark(),
                None => break,
            }
        }
        guard.unlock();
    }
}
