//! Reader-preferring policy.
//!
//! States: free, reading(n), writing. The *first* reader takes the global
//! lock on behalf of every reader and the *last* reader gives it back.
//! Writers simply take the global lock.
//!
//! A continuous stream of readers keeps the reader count above zero and can
//! postpone a waiting writer indefinitely. That starvation is the accepted
//! behaviour of this policy; [`WriterPreferring`] is the alternative.
//!
//! [`WriterPreferring`]: super::WriterPreferring

use super::RawRwLock;
use crate::sync::mutex::{Mutex, RawMutex};
use lockstep_raw::{AtomicFlag, FlagState};

/// A reader-writer lock that favours readers.
#[derive(Default)]
pub struct ReaderPreferring {
    readers: Mutex<usize>,
    global: RawMutex,
    // Held only while a writer, not the readers, owns `global`.
    writer: AtomicFlag,
}

impl ReaderPreferring {
    /// Creates a free lock.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RawRwLock for ReaderPreferring {
    fn read_lock(&self) {
        let mut readers = self.readers.lock();
        *readers += 1;
        if *readers == 1 {
            // Later readers queue up on `readers` while a writer holds on.
            self.global.acquire();
        }
        readers.unlock();
    }

    fn try_read_lock(&self) -> bool {
        let Ok(mut readers) = self.readers.try_lock() else {
            return false;
        };
        if *readers == 0 && !self.global.try_acquire() {
            readers.unlock();
            return false;
        }
        *readers += 1;
        readers.unlock();
        true
    }

    fn read_unlock(&self) {
        let mut readers = self.readers.lock();
        assert!(
            *readers > 0,
            "ReaderPreferring::read_unlock called without a matching read_lock."
        );
        *readers -= 1;
        if *readers == 0 {
            self.global.release();
        }
        readers.unlock();
    }

    fn write_lock(&self) {
        self.global.acquire();
        self.writer.store(FlagState::Held);
    }

    fn try_write_lock(&self) -> bool {
        let acquired = self.global.try_acquire();
        if acquired {
            self.writer.store(FlagState::Held);
        }
        acquired
    }

    fn write_unlock(&self) {
        if self.writer.swap(FlagState::Free) == FlagState::Free {
            panic!("ReaderPreferring::write_unlock called without a matching write_lock.");
        }
        self.global.release();
    }
}
