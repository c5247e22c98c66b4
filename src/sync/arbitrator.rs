//! # Multi-resource arbitrator.
//!
//! Locking several resources one by one invites circular wait: thread A holds
//! `x` and waits for `y` while thread B holds `y` and waits for `x`. The
//! usual cure is a global acquisition order, which forces every caller to
//! sort its identifiers. The [`Arbitrator`] instead grants a whole *set* of
//! resources in one indivisible step. No caller ever holds a strict subset
//! of what it asked for while it waits for the rest, so a cycle cannot form.
//!
//! A caller whose set is partially taken waits and then re-checks the whole
//! set from scratch. Under contention this repeats work but never breaks
//! correctness.

use super::{condition_variable::ConditionVariable, mutex::Mutex};
use std::collections::HashSet;
use std::hash::Hash;

/// Grants exclusive access to sets of resources, all or nothing.
///
/// # Examples
///
/// ```
/// use lockstep::sync::Arbitrator;
///
/// let arbitrator = Arbitrator::new();
/// arbitrator.lock_all(&["alice", "bob"]);
/// assert!(!arbitrator.try_lock_all(&["bob", "carol"]));
/// assert!(arbitrator.try_lock_all(&["carol"]));
/// arbitrator.unlock_all(&["alice", "bob"]);
/// arbitrator.unlock_all(&["carol"]);
/// ```
pub struct Arbitrator<K> {
    in_use: Mutex<HashSet<K>>,
    released: ConditionVariable,
}

impl<K: Eq + Hash + Clone> Arbitrator<K> {
    /// Creates an arbitrator with every resource free.
    pub fn new() -> Self {
        Self {
            in_use: Mutex::new(HashSet::new()),
            released: ConditionVariable::new(),
        }
    }

    /// Blocks until none of `ids` is in use, then marks all of them as in use.
    ///
    /// Duplicate ids are treated as one.
    pub fn lock_all(&self, ids: &[K]) {
        let mut in_use = self.in_use.lock();
        while ids.iter().any(|id| in_use.contains(id)) {
            log::trace!(
                "arbitrator: {} requested resources partially in use",
                ids.len()
            );
            in_use = self.released.wait(in_use);
        }
        in_use.extend(ids.iter().cloned());
        in_use.unlock();
    }

    /// Marks all of `ids` as in use if none of them is, without blocking.
    ///
    /// Returns `true` if the whole set was granted.
    pub fn try_lock_all(&self, ids: &[K]) -> bool {
        let mut in_use = self.in_use.lock();
        let granted = !ids.iter().any(|id| in_use.contains(id));
        if granted {
            in_use.extend(ids.iter().cloned());
        }
        in_use.unlock();
        granted
    }

    /// Frees all of `ids` and wakes every waiter.
    ///
    /// # Panics
    /// Panics if any of `ids` is not in use. In that case nothing is freed.
    pub fn unlock_all(&self, ids: &[K]) {
        let mut in_use = self.in_use.lock();
        assert!(
            ids.iter().all(|id| in_use.contains(id)),
            "Arbitrator::unlock_all called on a resource that is not locked."
        );
        for id in ids {
            in_use.remove(id);
        }
        self.released.broadcast(in_use);
    }
}

impl<K: Eq + Hash + Clone> Default for Arbitrator<K> {
    fn default() -> Self {
        Self::new()
    }
}
