mod common;

use common::{init_logging, settle, spin_until};
use lockstep::sync::{Barrier, WaitGroup};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[test]
fn rounds_do_not_mix() {
    init_logging();
    const PARTIES: usize = 6;
    const ROUNDS: usize = 50;
    let barrier = Arc::new(Barrier::new(PARTIES));
    let counters = || -> Arc<Vec<AtomicUsize>> {
        Arc::new((0..ROUNDS).map(|_| AtomicUsize::new(0)).collect())
    };
    let (arrived, leaders) = (counters(), counters());

    let handles: Vec<_> = (0..PARTIES)
        .map(|_| {
            let (barrier, arrived, leaders) = (barrier.clone(), arrived.clone(), leaders.clone());
            std::thread::spawn(move || {
                for round in 0..ROUNDS {
                    arrived[round].fetch_add(1, Ordering::SeqCst);
                    if barrier.wait().is_leader() {
                        leaders[round].fetch_add(1, Ordering::SeqCst);
                    }
                    // Nobody leaves a round before everybody reached it.
                    assert_eq!(arrived[round].load(Ordering::SeqCst), PARTIES);
                    // Nobody can have entered the round after next yet.
                    if let Some(after_next) = arrived.get(round + 2) {
                        assert_eq!(after_next.load(Ordering::SeqCst), 0);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(leaders.iter().all(|l| l.load(Ordering::SeqCst) == 1));
}

#[test]
fn last_arrival_releases_everyone() {
    init_logging();
    let barrier = Arc::new(Barrier::new(3));
    let passed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let (barrier, passed) = (barrier.clone(), passed.clone());
            std::thread::spawn(move || {
                barrier.wait();
                passed.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    settle();
    assert_eq!(passed.load(Ordering::SeqCst), 0);

    barrier.wait();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(passed.load(Ordering::SeqCst), 2);
}

#[test]
fn wait_group_waits_for_every_worker() {
    init_logging();
    const WORKERS: usize = 8;
    let group = Arc::new(WaitGroup::new());
    let finished = Arc::new(AtomicUsize::new(0));
    let go = Arc::new(AtomicBool::new(false));

    group.add(WORKERS);
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let (group, finished, go) = (group.clone(), finished.clone(), go.clone());
            std::thread::spawn(move || {
                spin_until(|| go.load(Ordering::SeqCst));
                finished.fetch_add(1, Ordering::SeqCst);
                group.done();
            })
        })
        .collect();

    assert!(!group.try_wait());
    go.store(true, Ordering::SeqCst);
    group.wait();
    assert_eq!(finished.load(Ordering::SeqCst), WORKERS);
    assert!(group.try_wait());

    for handle in handles {
        handle.join().unwrap();
    }
}
