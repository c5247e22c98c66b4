//! # lockstep-raw: the leaves of the lockstep primitives.
//!
//! This crate holds everything that does not need a blocking mutex to be
//! built:
//!
//! - [`atomic`]: the [`AtomicFlag`], a single word that is only mutated with
//!   compare-and-swap, swap and store.
//! - [`spinlock`]: [`RawSpinLock`] and [`SpinLock`], busy-waiting mutual
//!   exclusion built on the flag.
//! - [`park`]: [`ParkHandle`] and [`Current::park_with`], the suspension
//!   mechanism every blocking primitive in `lockstep` is built on.
//! - [`lock`]: the [`RawLock`] interface shared by the busy-wait and the
//!   blocking mutual-exclusion locks.
//!
//! Blocking primitives (mutex, condition variable, semaphores, ...) live in
//! the `lockstep` crate, which re-exports this one.

#![deny(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod atomic;
pub mod lock;
pub mod park;
pub mod spinlock;

pub use atomic::{AtomicFlag, FlagState};
pub use lock::RawLock;
pub use park::{Current, ParkHandle};
pub use spinlock::{RawSpinLock, SpinLock, SpinLockGuard, WouldBlock};
