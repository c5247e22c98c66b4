//! # Synchronization Primitives.
//!
//! Different synchronization primitives are suited to different concurrency
//! patterns. The table below summarizes their key characteristics:
//!
//! | Primitive                | Blocks Thread? | Wake policy      | Typical Use Case                              |
//! |--------------------------|----------------|------------------|-----------------------------------------------|
//! | [`RawSpinLock`]          | No (busy wait) | -                | Short, uncontended critical sections          |
//! | [`Mutex`]                | Yes            | One              | Exclusive access to shared data               |
//! | [`ConditionVariable`]    | Yes            | One or all       | Waiting for a condition to become true        |
//! | [`Semaphore`]            | Yes            | One              | Limiting access to a bounded resource         |
//! | [`WeightedSemaphore`]    | Yes            | All              | Variable-sized claims on a bounded resource   |
//! | [`Channel`]              | Yes            | One              | Producer/consumer hand-off                    |
//! | [`RwLock`]               | Yes            | Depends on policy| Many readers or one writer                    |
//! | [`Barrier`]              | Yes            | All              | Rounds of N-party rendezvous                  |
//! | [`Arbitrator`]           | Yes            | All              | Deadlock-free locking of resource sets        |
//! | [`WaitGroup`]            | Yes            | All              | Waiting for a group of tasks to finish        |
//!
//! [`RawSpinLock`]: crate::RawSpinLock

pub mod arbitrator;
pub mod barrier;
pub mod channel;
pub mod condition_variable;
pub mod mutex;
pub mod rwlock;
pub mod semaphore;
pub mod wait_group;
pub mod weighted;

pub use arbitrator::Arbitrator;
pub use barrier::{Barrier, BarrierWaitResult};
pub use channel::{BoundedQueue, Channel, CondvarChannel};
pub use condition_variable::ConditionVariable;
pub use mutex::{Mutex, MutexGuard, RawMutex};
pub use rwlock::{Policy, PolicyLock, RawRwLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
pub use semaphore::{Semaphore, SemaphorePermit};
pub use wait_group::WaitGroup;
pub use weighted::WeightedSemaphore;
