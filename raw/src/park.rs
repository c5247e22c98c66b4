//! Thread parking.
//!
//! Blocking primitives suspend a thread by parking it. The thread to be
//! suspended hands out a [`ParkHandle`] *before* it falls asleep, through
//! [`Current::park_with`]. Whoever later consumes the handle with
//! [`ParkHandle::unpark`] makes the thread runnable again.
//!
//! Publishing the handle before sleeping is what rules out missed wakeups:
//! a waker that finds the handle may call `unpark` at any time, even before
//! the owner has actually parked, and the owner will then return from
//! `park_with` immediately.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, Thread};

/// A handle that represents a parked (or about to be parked) thread.
pub struct ParkHandle {
    thread: Thread,
    woken: Arc<AtomicBool>,
}

impl ParkHandle {
    /// Consume the handle and unpark the underlying thread.
    pub fn unpark(self) {
        self.woken.store(true, Ordering::Release);
        self.thread.unpark();
    }
}

impl core::fmt::Debug for ParkHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParkHandle")
            .field("thread", &self.thread.id())
            .field("woken", &self.woken.load(Ordering::Relaxed))
            .finish()
    }
}

/// The opaque structure indicating the running thread.
pub struct Current {
    _p: (),
}

impl Current {
    /// Run a function `f` with [`ParkHandle`] for current thread, and then park
    /// the current thread until the handle is consumed.
    ///
    /// `f` runs before the thread goes to sleep. It is the place to publish
    /// the handle and to release whatever lock protected the decision to
    /// sleep.
    pub fn park_with(f: impl FnOnce(ParkHandle)) {
        let woken = Arc::new(AtomicBool::new(false));
        f(ParkHandle {
            thread: thread::current(),
            woken: woken.clone(),
        });
        // `thread::park` may return spuriously.
        while !woken.load(Ordering::Acquire) {
            thread::park();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpark_before_park_returns_immediately() {
        Current::park_with(|handle| handle.unpark());
    }

    #[test]
    fn unpark_from_other_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let waker = thread::spawn(move || {
            let handle: ParkHandle = rx.recv().unwrap();
            handle.unpark();
        });
        Current::park_with(|handle| tx.send(handle).unwrap());
        waker.join().unwrap();
    }
}
