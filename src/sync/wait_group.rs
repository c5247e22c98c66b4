//! Wait group.
//!
//! A counter of outstanding tasks. [`WaitGroup::add`] registers tasks,
//! [`WaitGroup::done`] retires one and [`WaitGroup::wait`] blocks until none
//! is outstanding. Tasks may be added after creation, including while
//! another thread is already waiting.

use super::{condition_variable::ConditionVariable, mutex::Mutex};

/// Waits for a group of tasks to finish.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep::sync::WaitGroup;
///
/// let group = Arc::new(WaitGroup::new());
/// group.add(4);
/// for _ in 0..4 {
///     let group = group.clone();
///     std::thread::spawn(move || group.done());
/// }
/// group.wait();
/// assert!(group.try_wait());
/// ```
#[derive(Default)]
pub struct WaitGroup {
    outstanding: Mutex<usize>,
    finished: ConditionVariable,
}

impl WaitGroup {
    /// Creates a group with no outstanding task.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `delta` more outstanding tasks.
    pub fn add(&self, delta: usize) {
        let mut outstanding = self.outstanding.lock();
        *outstanding += delta;
        outstanding.unlock();
    }

    /// Retires one task, waking every waiter when it was the last one.
    ///
    /// # Panics
    /// Panics if no task is outstanding.
    pub fn done(&self) {
        let mut outstanding = self.outstanding.lock();
        assert!(*outstanding > 0, "WaitGroup::done called more times than add.");
        *outstanding -= 1;
        if *outstanding == 0 {
            self.finished.broadcast(outstanding);
        } else {
            outstanding.unlock();
        }
    }

    /// Blocks until no task is outstanding.
    pub fn wait(&self) {
        self.finished
            .wait_while(&self.outstanding, |outstanding| *outstanding > 0)
            .unlock();
    }

    /// Returns `true` if no task is outstanding, without blocking.
    pub fn try_wait(&self) -> bool {
        let outstanding = self.outstanding.lock();
        let idle = *outstanding == 0;
        outstanding.unlock();
        idle
    }
}
