// SPDX-License-Identifier: MIT
//
// Mailbox: bounded hand-off from the input actor to the controller.
//
// A FIFO queue behind a `Mutex` + `Condvar`. The consumer blocks until an
// item arrives or the mailbox is closed. The producer never blocks: when
// the queue is full, the oldest pending item is evicted to make room. The
// newest keystroke is therefore always delivered, and a stalled controller
// costs at most the oldest keystrokes beyond `capacity`.
//
// Urgent items (SIGINT) go into a separate lane that is never evicted and
// is drained before the ordinary queue.
//
// Evictions are counted so the controller can report them.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
#[cfg(test)]
use std::time::Duration;

/// Default capacity: several dozen keystrokes, far more than a human can
/// type during one render.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug)]
struct State<T> {
    urgent: VecDeque<T>,
    queue: VecDeque<T>,
    closed: bool,
    evicted: u64,
}

#[derive(Debug)]
struct Shared<T> {
    state: Mutex<State<T>>,
    ready: Condvar,
    capacity: usize,
}

/// Bounded, drop-oldest, multi-producer mailbox.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug)]
pub struct Mailbox<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Mailbox<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// What happened to a pushed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued.
    Queued,
    /// Queued, but the oldest pending item was evicted to make room.
    Evicted,
    /// The mailbox is closed; the item was dropped.
    Closed,
}

impl<T> Mailbox<T> {
    /// Create a mailbox holding at most `capacity` pending items.
    ///
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    urgent: VecDeque::new(),
                    queue: VecDeque::with_capacity(capacity),
                    closed: false,
                    evicted: 0,
                }),
                ready: Condvar::new(),
                capacity,
            }),
        }
    }

    /// Create a mailbox with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    // A panicking holder cannot leave the queue half-updated, so poisoning
    // is ignored.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue an item and wake the consumer. Never blocks on a full queue.
    pub fn push(&self, item: T) -> Delivery {
        let mut state = self.lock();
        if state.closed {
            return Delivery::Closed;
        }

        let mut delivery = Delivery::Queued;
        if state.queue.len() >= self.shared.capacity {
            state.queue.pop_front();
            state.evicted += 1;
            delivery = Delivery::Evicted;
        }
        state.queue.push_back(item);
        drop(state);

        self.shared.ready.notify_one();
        delivery
    }

    /// Queue an item ahead of every ordinary one. Urgent items do not count
    /// against the capacity and are never evicted.
    pub fn push_urgent(&self, item: T) -> Delivery {
        let mut state = self.lock();
        if state.closed {
            return Delivery::Closed;
        }
        state.urgent.push_back(item);
        drop(state);

        self.shared.ready.notify_one();
        Delivery::Queued
    }

    /// Block until an item is available.
    ///
    /// Returns `None` once the mailbox is closed and drained.
    pub fn recv(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.pop() {
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = self
                .shared
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Close the mailbox. Pending items can still be received; further
    /// pushes are dropped and blocked receivers wake up.
    pub fn close(&self) {
        self.lock().closed = true;
        self.shared.ready.notify_all();
    }

    /// Total items evicted because the queue was full.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.lock().evicted
    }
}

impl<T> State<T> {
    fn pop(&mut self) -> Option<T> {
        self.urgent.pop_front().or_else(|| self.queue.pop_front())
    }
}

#[cfg(test)]
impl<T> Mailbox<T> {
    /// Like [`recv`](Self::recv), but gives up after `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<T> {
        let state = self.lock();
        let (mut state, _) = self
            .shared
            .ready
            .wait_timeout_while(state, timeout, |s| {
                s.urgent.is_empty() && s.queue.is_empty() && !s.closed
            })
            .unwrap_or_else(PoisonError::into_inner);
        state.pop()
    }

    pub fn try_recv(&self) -> Option<T> {
        self.lock().pop()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        let state = self.lock();
        state.urgent.len() + state.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
