//! Writer-preferring policy.
//!
//! A writer registers itself in `writers_waiting` *before* it waits, and
//! readers refuse to enter while any writer is waiting or active. Readers
//! already inside drain out, and the writer goes next. No writer starves
//! as long as writers arrive at a bounded rate. Readers, in turn, may stall
//! behind a queue of writers.

use super::RawRwLock;
use crate::sync::{condition_variable::ConditionVariable, mutex::Mutex};

#[derive(Debug, Default)]
struct RwState {
    readers: usize,
    writers_waiting: usize,
    writer_active: bool,
}

impl RwState {
    fn admits_reader(&self) -> bool {
        self.writers_waiting == 0 && !self.writer_active
    }

    fn admits_writer(&self) -> bool {
        self.readers == 0 && !self.writer_active
    }
}

/// A reader-writer lock that favours writers.
#[derive(Default)]
pub struct WriterPreferring {
    state: Mutex<RwState>,
    changed: ConditionVariable,
}

impl WriterPreferring {
    /// Creates a free lock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RawRwLock for WriterPreferring {
    fn read_lock(&self) {
        let mut state = self
            .changed
            .wait_while(&self.state, |state| !state.admits_reader());
        state.readers += 1;
        state.unlock();
    }

    fn try_read_lock(&self) -> bool {
        let mut state = self.state.lock();
        let admitted = state.admits_reader();
        if admitted {
            state.readers += 1;
        }
        state.unlock();
        admitted
    }

    fn read_unlock(&self) {
        let mut state = self.state.lock();
        assert!(
            state.readers > 0,
            "WriterPreferring::read_unlock called without a matching read_lock."
        );
        state.readers -= 1;
        if state.readers == 0 {
            // Only now can a waiting writer proceed.
            self.changed.broadcast(state);
        } else {
            state.unlock();
        }
    }

    fn write_lock(&self) {
        let mut state = self.state.lock();
        state.writers_waiting += 1;
        while !state.admits_writer() {
            log::trace!(
                "rwlock: writer waiting behind {} readers (active writer: {})",
                state.readers,
                state.writer_active
            );
            state = self.changed.wait(state);
        }
        state.writers_waiting -= 1;
        state.writer_active = true;
        state.unlock();
    }

    fn try_write_lock(&self) -> bool {
        let mut state = self.state.lock();
        let admitted = state.admits_writer();
        if admitted {
            state.writer_active = true;
        }
        state.unlock();
        admitted
    }

    fn write_unlock(&self) {
        let mut state = self.state.lock();
        assert!(
            state.writer_active,
            "WriterPreferring::write_unlock called without a matching write_lock."
        );
        debug_assert_eq!(state.readers, 0);
        state.writer_active = false;
        // Both waiting readers and waiting writers re-check.
        self.changed.broadcast(state);
    }
}
