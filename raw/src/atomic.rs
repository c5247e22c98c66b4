//! A single-word atomic flag.
//!
//! The flag is the only piece of state the busy-wait locks own. It is
//! mutated exclusively through atomic read-modify-write operations of the
//! CPU, so testing and setting the flag happens as one indivisible step.
//!
//! All operations use [`Ordering::SeqCst`]. The flag is padded to a cache
//! line so that spinning on one flag does not bounce unrelated data between
//! cores.

use core::sync::atomic::{AtomicU8, Ordering};
use crossbeam_utils::CachePadded;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The two states an [`AtomicFlag`] can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum FlagState {
    /// Nobody holds the flag.
    Free = 0,
    /// Exactly one holder owns the flag.
    Held = 1,
}

/// A [`FlagState`] that can be safely shared between threads.
pub struct AtomicFlag(CachePadded<AtomicU8>);

#[inline]
fn decode(raw: u8) -> FlagState {
    FlagState::try_from(raw)
        .unwrap_or_else(|_| unreachable!("AtomicFlag holds an invalid state {raw}"))
}

impl AtomicFlag {
    /// Creates a new flag in the given state.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockstep_raw::{AtomicFlag, FlagState};
    ///
    /// let flag = AtomicFlag::new(FlagState::Free);
    /// assert_eq!(flag.load(), FlagState::Free);
    /// ```
    #[inline]
    pub fn new(state: FlagState) -> Self {
        Self(CachePadded::new(AtomicU8::new(state.into())))
    }

    /// Loads the current state.
    #[inline]
    pub fn load(&self) -> FlagState {
        decode(self.0.load(Ordering::SeqCst))
    }

    /// Stores `state` into the flag.
    #[inline]
    pub fn store(&self, state: FlagState) {
        self.0.store(state.into(), Ordering::SeqCst)
    }

    /// Stores `state` into the flag, returning the previous state.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockstep_raw::{AtomicFlag, FlagState};
    ///
    /// let flag = AtomicFlag::new(FlagState::Held);
    /// assert_eq!(flag.swap(FlagState::Free), FlagState::Held);
    /// assert_eq!(flag.load(), FlagState::Free);
    /// ```
    #[inline]
    pub fn swap(&self, state: FlagState) -> FlagState {
        decode(self.0.swap(state.into(), Ordering::SeqCst))
    }

    /// Stores `new` into the flag if the current state is `current`.
    ///
    /// The return value is a result indicating whether the new state was
    /// written and containing the previous state. On success this value is
    /// guaranteed to be equal to `current`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockstep_raw::{AtomicFlag, FlagState};
    ///
    /// let flag = AtomicFlag::new(FlagState::Free);
    /// assert_eq!(flag.compare_exchange(FlagState::Free, FlagState::Held), Ok(FlagState::Free));
    /// assert_eq!(flag.compare_exchange(FlagState::Free, FlagState::Held), Err(FlagState::Held));
    /// ```
    #[inline]
    pub fn compare_exchange(
        &self,
        current: FlagState,
        new: FlagState,
    ) -> Result<FlagState, FlagState> {
        self.0
            .compare_exchange(current.into(), new.into(), Ordering::SeqCst, Ordering::SeqCst)
            .map(decode)
            .map_err(decode)
    }
}

impl Default for AtomicFlag {
    /// Creates a [`FlagState::Free`] flag.
    fn default() -> Self {
        Self::new(FlagState::Free)
    }
}

impl core::fmt::Debug for AtomicFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AtomicFlag").field(&self.load()).finish()
    }
}
