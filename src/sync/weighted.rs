//! # Weighted Semaphore.
//!
//! A [`WeightedSemaphore`] generalizes the counting semaphore to claims of
//! any size: `acquire(n)` proceeds only once `n` permits are available and
//! takes them all at once.
//!
//! Releasing wakes **every** waiter. One release may satisfy several
//! waiters with different requirements, and a waiter that was woken but
//! still cannot proceed must go back to sleep without swallowing the wakeup
//! that another waiter needed.

use super::{condition_variable::ConditionVariable, mutex::Mutex};

/// A semaphore whose acquirers claim a variable number of permits.
///
/// # Examples
///
/// ```
/// use lockstep::sync::WeightedSemaphore;
///
/// let sema = WeightedSemaphore::new(5);
/// sema.acquire(3);
/// assert!(!sema.try_acquire(3));
/// sema.release(3);
/// assert!(sema.try_acquire(5));
/// ```
pub struct WeightedSemaphore {
    permits: Mutex<usize>,
    limit: Option<usize>,
    changed: ConditionVariable,
}

impl WeightedSemaphore {
    /// Creates a semaphore with `permits` initial permits and no upper
    /// bound.
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            limit: None,
            changed: ConditionVariable::new(),
        }
    }

    /// Creates a semaphore with `permits` initial permits that may never hold
    /// more than `limit` permits.
    ///
    /// # Panics
    /// Panics if `permits > limit`.
    pub fn with_limit(permits: usize, limit: usize) -> Self {
        assert!(
            permits <= limit,
            "WeightedSemaphore: initial permits {permits} exceed the limit {limit}."
        );
        Self {
            permits: Mutex::new(permits),
            limit: Some(limit),
            changed: ConditionVariable::new(),
        }
    }

    #[track_caller]
    fn check_request(&self, n: usize) {
        assert!(n > 0, "WeightedSemaphore: permit count must be positive.");
        if let Some(limit) = self.limit {
            assert!(
                n <= limit,
                "WeightedSemaphore: {n} permits requested but the limit is {limit}."
            );
        }
    }

    /// Blocks until `n` permits are available, then takes them.
    ///
    /// # Panics
    /// Panics if `n` is zero or larger than the limit.
    #[track_caller]
    pub fn acquire(&self, n: usize) {
        self.check_request(n);
        let mut permits = self.changed.wait_while(&self.permits, |permits| *permits < n);
        *permits -= n;
        permits.unlock();
    }

    /// Takes `n` permits if they are available, without blocking.
    ///
    /// # Panics
    /// Panics if `n` is zero or larger than the limit.
    #[track_caller]
    pub fn try_acquire(&self, n: usize) -> bool {
        self.check_request(n);
        let mut permits = self.permits.lock();
        let acquired = *permits >= n;
        if acquired {
            *permits -= n;
        }
        permits.unlock();
        acquired
    }

    /// Returns `n` permits and wakes every waiter.
    ///
    /// # Panics
    /// Panics if `n` is zero, or if the release would push the permit count
    /// past the limit (an unmatched release).
    #[track_caller]
    pub fn release(&self, n: usize) {
        assert!(n > 0, "WeightedSemaphore: permit count must be positive.");
        let mut permits = self.permits.lock();
        let total = permits
            .checked_add(n)
            .filter(|total| self.limit.is_none_or(|limit| *total <= limit));
        match total {
            Some(total) => *permits = total,
            None => panic!(
                "WeightedSemaphore: releasing {n} permits on top of {} exceeds the limit.",
                *permits
            ),
        }
        self.changed.broadcast(permits);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "must be positive")]
    fn zero_acquire_is_rejected() {
        WeightedSemaphore::new(1).acquire(0);
    }

    #[test]
    #[should_panic(expected = "exceeds the limit")]
    fn unmatched_release_is_rejected() {
        let sema = WeightedSemaphore::with_limit(2, 2);
        sema.release(1);
    }

    #[test]
    #[should_panic(expected = "limit is 4")]
    fn request_above_limit_is_rejected() {
        WeightedSemaphore::with_limit(4, 4).acquire(5);
    }

    #[test]
    fn heterogeneous_claims() {
        let sema = WeightedSemaphore::with_limit(4, 4);
        assert!(sema.try_acquire(3));
        assert!(!sema.try_acquire(2));
        assert!(sema.try_acquire(1));
        sema.release(4);
        assert!(sema.try_acquire(4));
    }
}
