mod common;

use common::{init_logging, settle, spin_until};
use lockstep::sync::{Semaphore, WeightedSemaphore};
use proptest::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[test]
fn sema_0() {
    init_logging();
    let sema = Arc::new(Semaphore::new(0));
    let spawned = Arc::new(AtomicBool::new(false));
    let passed = Arc::new(AtomicBool::new(false));

    let handle = {
        let (sema, spawned, passed) = (sema.clone(), spawned.clone(), passed.clone());
        std::thread::spawn(move || {
            spawned.store(true, Ordering::SeqCst);
            sema.acquire();
            passed.store(true, Ordering::SeqCst);
        })
    };

    spin_until(|| spawned.load(Ordering::SeqCst));
    settle();
    assert!(
        !passed.load(Ordering::SeqCst),
        "Semaphore with zero permits must block"
    );

    sema.release();
    handle.join().unwrap();
    assert!(passed.load(Ordering::SeqCst));
}

#[test]
fn sema_1() {
    init_logging();
    const WAITERS: usize = 10;
    let sema = Arc::new(Semaphore::new(0));
    let counter = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..WAITERS)
        .map(|_| {
            let (sema, counter) = (sema.clone(), counter.clone());
            std::thread::spawn(move || {
                sema.acquire();
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    settle();
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    // Each release admits exactly one waiter.
    for expected in 1..=WAITERS {
        sema.release();
        spin_until(|| counter.load(Ordering::SeqCst) >= expected);
        settle();
        assert_eq!(counter.load(Ordering::SeqCst), expected);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn access_bounds_concurrency() {
    init_logging();
    const PERMITS: usize = 3;
    const THREADS: usize = 12;
    let sema = Arc::new(Semaphore::new(PERMITS));
    let inside = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let (sema, inside, peak) = (sema.clone(), inside.clone(), peak.clone());
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let _permit = sema.access();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    std::thread::yield_now();
                    inside.fetch_sub(1, Ordering::SeqCst);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(peak.load(Ordering::SeqCst) <= PERMITS);
    for _ in 0..PERMITS {
        assert!(sema.try_acquire());
    }
    assert!(!sema.try_acquire());
}

#[test]
fn weighted_release_wakes_every_fitting_waiter() {
    init_logging();
    let sema = Arc::new(WeightedSemaphore::new(0));
    let done = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = [2, 3, 1]
        .into_iter()
        .map(|n| {
            let (sema, done) = (sema.clone(), done.clone());
            std::thread::spawn(move || {
                sema.acquire(n);
                done.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    settle();
    assert_eq!(done.load(Ordering::SeqCst), 0);

    // A single release large enough for all three must admit all three.
    sema.release(6);
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(done.load(Ordering::SeqCst), 3);
    assert!(!sema.try_acquire(1));
}

#[test]
fn weighted_large_request_waits_for_enough_permits() {
    init_logging();
    let sema = Arc::new(WeightedSemaphore::new(1));
    let passed = Arc::new(AtomicBool::new(false));

    let handle = {
        let (sema, passed) = (sema.clone(), passed.clone());
        std::thread::spawn(move || {
            sema.acquire(3);
            passed.store(true, Ordering::SeqCst);
        })
    };

    sema.release(1);
    settle();
    assert!(!passed.load(Ordering::SeqCst));

    sema.release(1);
    handle.join().unwrap();
    assert!(!sema.try_acquire(1));
}

#[derive(Debug, Clone)]
enum Op {
    Acquire(usize),
    Release(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..4).prop_map(Op::Acquire),
        (1usize..4).prop_map(Op::Release),
    ]
}

proptest! {
    #[test]
    fn weighted_permits_are_conserved(initial in 0usize..8, ops in prop::collection::vec(op(), 0..64)) {
        let sema = WeightedSemaphore::new(initial);
        let mut available = initial;

        for op in ops {
            match op {
                Op::Acquire(n) => {
                    prop_assert_eq!(sema.try_acquire(n), available >= n);
                    if available >= n {
                        available -= n;
                    }
                }
                Op::Release(n) => {
                    sema.release(n);
                    available += n;
                }
            }
        }

        // Exactly `available` permits remain, one at a time.
        for _ in 0..available {
            prop_assert!(sema.try_acquire(1));
        }
        prop_assert!(!sema.try_acquire(1));
    }

    #[test]
    fn counting_permits_are_conserved(initial in 0usize..8, ops in prop::collection::vec(any::<bool>(), 0..64)) {
        let sema = Semaphore::new(initial);
        let mut available = initial;

        for acquire in ops {
            if acquire {
                prop_assert_eq!(sema.try_acquire(), available > 0);
                available = available.saturating_sub(1);
            } else {
                sema.release();
                available += 1;
            }
        }

        for _ in 0..available {
            prop_assert!(sema.try_acquire());
        }
        prop_assert!(!sema.try_acquire());
    }
}
