//! # lockstep: synchronization primitives from first principles
//!
//! `lockstep` builds a family of blocking synchronization primitives out of
//! nothing more than an atomic flag, a busy-wait spinlock and the ability to
//! park and unpark a thread. Nothing here wraps a lock from the standard
//! library; every primitive owns its counters, mutates them only while its
//! internal lock is held, and decides by itself when a caller must sleep.
//!
//! ## Dependency order
//!
//! 1. **Atomic Flag** ([`AtomicFlag`]): a single word mutated only through
//!    compare-and-swap, swap and store.
//! 2. **Mutex + Condition Variable** ([`sync::Mutex`],
//!    [`sync::ConditionVariable`]): blocking mutual exclusion and
//!    predicate-guarded waiting, built on a [`SpinLock`] and thread parking.
//! 3. **Semaphores** ([`sync::Semaphore`], [`sync::WeightedSemaphore`]).
//! 4. **Bounded queues** ([`sync::Channel`], [`sync::CondvarChannel`]).
//! 5. **Reader-writer locks** ([`sync::rwlock`]), with a reader-preferring and
//!    a writer-preferring policy.
//! 6. **Barrier** ([`sync::Barrier`]), a reusable N-party rendezvous.
//! 7. **Arbitrator** ([`sync::Arbitrator`]), all-or-nothing acquisition of a
//!    set of resources.
//! 8. **Spinlock** ([`RawSpinLock`]), the busy-wait alternative to
//!    [`sync::RawMutex`] behind the same [`RawLock`] interface.
//!
//! A [`sync::WaitGroup`] completes the family.
//!
//! ## Waking rules
//!
//! Every primitive checks its predicate and goes to sleep under the same
//! held lock that a waker holds while it mutates state and signals. There is
//! no window in which a wakeup can be lost. Single-wake
//! ([`sync::ConditionVariable::signal`]) is used only where any waiter is
//! interchangeable with any other; wherever one release may satisfy
//! waiters of different kinds, the primitive broadcasts.
//!
//! None of the primitives guarantees the order in which blocked waiters are
//! woken, and none supports timeouts or cancellation. FIFO order is only
//! guaranteed for the elements of a bounded queue.
//!
//! ## Misuse
//!
//! Contract violations, such as releasing a lock that is not held,
//! requesting zero permits or finishing a wait group below zero, panic
//! immediately. Non-blocking attempts report failure either as `false` or as
//! [`WouldBlock`].

#![deny(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod sync;

pub use lockstep_raw::{
    AtomicFlag, Current, FlagState, ParkHandle, RawLock, RawSpinLock, SpinLock, SpinLockGuard,
    WouldBlock,
};
