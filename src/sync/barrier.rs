//! Barrier for N-way rendezvous.
//!
//! The barrier trips when `parties` callers have arrived. The caller that
//! completes a round resets the arrival count and wakes every waiter in the
//! same held-lock step, so a fast caller that starts the next round can never
//! see a stale count. A generation number tells the rounds apart. A waiter
//! leaves only once the generation it arrived in has ended. Exactly one
//! caller per round observes `is_leader() == true`.

use super::{condition_variable::ConditionVariable, mutex::Mutex};

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// Reusable barrier for N-way rendezvous.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lockstep::sync::Barrier;
///
/// let barrier = Arc::new(Barrier::new(3));
/// let handles: Vec<_> = (0..3)
///     .map(|_| {
///         let barrier = barrier.clone();
///         std::thread::spawn(move || barrier.wait().is_leader())
///     })
///     .collect();
/// let leaders = handles
///     .into_iter()
///     .map(|h| h.join().unwrap())
///     .filter(|leader| *leader)
///     .count();
/// assert_eq!(leaders, 1);
/// ```
pub struct Barrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: ConditionVariable,
}

impl Barrier {
    /// Creates a new barrier that trips when `parties` have arrived.
    ///
    /// # Panics
    /// Panics if `parties == 0`.
    pub fn new(parties: usize) -> Self {
        assert!(parties > 0, "Barrier requires at least 1 party.");
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            released: ConditionVariable::new(),
        }
    }

    /// Returns the number of parties required to trip the barrier.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Waits until all parties of the current round have arrived.
    pub fn wait(&self) -> BarrierWaitResult {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            log::trace!(
                "barrier: round {generation} complete, releasing {} parties",
                self.parties
            );
            self.released.broadcast(state);
            return BarrierWaitResult { is_leader: true };
        }

        while state.generation == generation {
            state = self.released.wait(state);
        }
        state.unlock();
        BarrierWaitResult { is_leader: false }
    }
}

/// Result of a barrier wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    is_leader: bool,
}

impl BarrierWaitResult {
    /// Returns `true` for the one caller that completed the round.
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}
