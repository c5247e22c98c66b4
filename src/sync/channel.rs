//! # Bounded blocking queues.
//!
//! A bounded queue ("channel") hands items from senders to receivers in
//! FIFO order. [`send`] blocks while the queue is at capacity, and
//! [`receive`] blocks while it is empty. Two constructions share the
//! [`BoundedQueue`] contract:
//!
//! - [`Channel`] gates senders with a *slots* semaphore (initially
//!   `capacity` permits) and receivers with an *items* semaphore (initially
//!   zero). The buffer has its own mutex, held only to push or pop. Waiting
//!   for permission and mutating the buffer are two separate steps.
//! - [`CondvarChannel`] keeps the buffer behind one mutex and one condition
//!   variable. Both operations broadcast after mutating, so waiting senders
//!   and waiting receivers both re-check their predicate.
//!
//! ## Unbuffered hand-off
//!
//! A capacity of zero is legal. A receiver first announces itself (one
//! extra slot on the semaphore, or one more waiting receiver on the
//! condition variable), and only then may a sender deposit an item. The
//! buffer therefore never holds more items than there are receivers blocked
//! waiting for one. With a non-zero capacity, the slot is given back only
//! after the item left the buffer, so the buffer never exceeds the capacity.
//!
//! [`send`]: BoundedQueue::send
//! [`receive`]: BoundedQueue::receive

use super::{condition_variable::ConditionVariable, mutex::Mutex, semaphore::Semaphore};
use crossbeam_utils::CachePadded;
use std::collections::VecDeque;

/// The contract shared by the bounded queue constructions.
pub trait BoundedQueue<M>: Send + Sync {
    /// Appends `item`, blocking while the queue is full.
    fn send(&self, item: M);

    /// Removes and returns the oldest item, blocking while the queue is
    /// empty.
    fn receive(&self) -> M;

    /// The fixed capacity the queue was created with.
    fn capacity(&self) -> usize;
}

/// A bounded queue built on two counting semaphores.
///
/// # Examples
///
/// ```
/// use lockstep::sync::{BoundedQueue, Channel};
///
/// let channel = Channel::new(2);
/// channel.send(1);
/// channel.send(2);
/// assert_eq!(channel.receive(), 1);
/// assert_eq!(channel.receive(), 2);
/// ```
pub struct Channel<M> {
    capacity: usize,
    // Senders and receivers hammer different semaphores.
    slots: CachePadded<Semaphore>,
    items: CachePadded<Semaphore>,
    buffer: Mutex<VecDeque<M>>,
}

impl<M> Channel<M> {
    /// Creates a channel holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: CachePadded::new(Semaphore::new(capacity)),
            items: CachePadded::new(Semaphore::new(0)),
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }
}

impl<M: Send> BoundedQueue<M> for Channel<M> {
    fn send(&self, item: M) {
        self.slots.acquire();
        let mut buffer = self.buffer.lock();
        buffer.push_back(item);
        buffer.unlock();
        self.items.release();
    }

    fn receive(&self) -> M {
        if self.capacity == 0 {
            // Let exactly one sender through for this receiver.
            self.slots.release();
        }
        self.items.acquire();
        let mut buffer = self.buffer.lock();
        let item = match buffer.pop_front() {
            Some(item) => item,
            None => unreachable!("Channel: an item permit was granted on an empty buffer."),
        };
        buffer.unlock();
        if self.capacity > 0 {
            self.slots.release();
        }
        item
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

struct ChannelState<M> {
    buffer: VecDeque<M>,
    // Only tracked for unbuffered channels.
    receivers_waiting: usize,
}

impl<M> ChannelState<M> {
    fn is_full(&self, capacity: usize) -> bool {
        let slots = if capacity == 0 {
            self.receivers_waiting
        } else {
            capacity
        };
        self.buffer.len() >= slots
    }
}

/// A bounded queue built on one mutex and one condition variable.
pub struct CondvarChannel<M> {
    capacity: usize,
    state: Mutex<ChannelState<M>>,
    changed: ConditionVariable,
}

impl<M> CondvarChannel<M> {
    /// Creates a channel holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(ChannelState {
                buffer: VecDeque::with_capacity(capacity),
                receivers_waiting: 0,
            }),
            changed: ConditionVariable::new(),
        }
    }
}

impl<M: Send> BoundedQueue<M> for CondvarChannel<M> {
    fn send(&self, item: M) {
        let capacity = self.capacity;
        let mut state = self
            .changed
            .wait_while(&self.state, |state| state.is_full(capacity));
        state.buffer.push_back(item);
        self.changed.broadcast(state);
    }

    fn receive(&self) -> M {
        if self.capacity == 0 {
            let mut state = self.state.lock();
            state.receivers_waiting += 1;
            self.changed.broadcast(state);
        }
        let mut state = self
            .changed
            .wait_while(&self.state, |state| state.buffer.is_empty());
        if self.capacity == 0 {
            state.receivers_waiting -= 1;
        }
        let item = match state.buffer.pop_front() {
            Some(item) => item,
            None => unreachable!("CondvarChannel: woke up on an empty buffer."),
        };
        self.changed.broadcast(state);
        item
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}
