use std::{collections::VecDeque, time::Duration};

use parking_lot::Mutex;
use thiserror::Error;
use tokio::{
    sync::Notify,
    time::{self, Instant},
};

/// Error returned by [`BoundedQueue::try_push`] when the queue is at
/// capacity. The message is dropped; callers log and move on.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("queue is at capacity ({capacity})")]
pub struct QueueFull {
    /// The fixed capacity of the queue.
    pub capacity: usize,
}

/// Error returned by [`BoundedQueue::push`] when no capacity freed up
/// within the timeout. Distinct from [`QueueFull`]: the caller waited and
/// still failed, rather than failing instantly.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("timed out after {timeout:?} waiting for queue capacity")]
pub struct PushTimeout {
    /// How long the caller waited.
    pub timeout: Duration,
}

/// A bounded FIFO message queue shared between two independently running
/// tasks, typically a node's own loop on one side and the link layer on the
/// other.
///
/// The container is a monitor: a mutex-guarded [`VecDeque`] paired with two
/// [`Notify`] handles, one waking producers blocked on capacity and one
/// waking consumers parked on an empty queue. Within one queue the order is
/// strict FIFO; nothing is guaranteed across queues.
///
/// A capacity of `0` means unbounded.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    capacity: usize,
    items: Mutex<VecDeque<T>>,
    /// Signalled once per pop. Parks producers blocked in [`push`](Self::push).
    space: Notify,
    /// Signalled once per push. Parks consumers in [`pop_wait`](Self::pop_wait).
    ready: Notify,
}

impl<T> BoundedQueue<T> {
    /// Creates a new queue. `capacity` is fixed for the queue's lifetime;
    /// `0` disables the bound entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: Mutex::new(VecDeque::new()),
            space: Notify::new(),
            ready: Notify::new(),
        }
    }

    /// Returns the fixed capacity of this queue (`0` = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of queued messages.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Returns `true` if no messages are queued.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Attempts to enqueue a message without blocking.
    ///
    /// Fails with [`QueueFull`] when the queue is at capacity; the message
    /// is dropped, never silently queued past the bound.
    pub fn try_push(&self, message: T) -> Result<(), QueueFull> {
        match self.offer(message) {
            Ok(()) => Ok(()),
            Err(_rejected) => Err(QueueFull { capacity: self.capacity }),
        }
    }

    /// Enqueues a message, suspending the calling task until capacity frees
    /// up, bounded by `timeout`.
    ///
    /// Expiry fails with [`PushTimeout`]. The bound keeps shutdown live: a
    /// producer can never stay suspended past the timeout even if the
    /// consuming side is gone.
    pub async fn push(&self, message: T, timeout: Duration) -> Result<(), PushTimeout> {
        let deadline = Instant::now() + timeout;
        let mut message = message;

        loop {
            // Register for the space wakeup before checking capacity, so a
            // pop landing between a failed offer and the await is not
            // missed.
            let space = self.space.notified();

            match self.offer(message) {
                Ok(()) => return Ok(()),
                Err(rejected) => {
                    message = rejected;

                    if time::timeout_at(deadline, space).await.is_err() {
                        return Err(PushTimeout { timeout });
                    }
                }
            }
        }
    }

    /// Dequeues the oldest message without blocking. Returns `None` on an
    /// empty queue.
    pub fn try_pop(&self) -> Option<T> {
        let item = self.items.lock().pop_front();

        if item.is_some() {
            self.space.notify_one();
        }

        item
    }

    /// Dequeues the oldest message, parking the calling task until one
    /// arrives or `timeout` elapses.
    ///
    /// Polling loops use this instead of spinning on [`try_pop`](Self::try_pop)
    /// while still re-checking their stop flag at a bounded interval.
    pub async fn pop_wait(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;

        loop {
            let ready = self.ready.notified();

            if let Some(item) = self.try_pop() {
                return Some(item);
            }

            if time::timeout_at(deadline, ready).await.is_err() {
                // A push may have landed while the timeout fired.
                return self.try_pop();
            }
        }
    }

    /// Enqueues unless at capacity, handing the message back on failure.
    fn offer(&self, message: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if self.capacity != 0 && items.len() >= self.capacity {
            return Err(message);
        }

        items.push_back(message);
        drop(items);

        self.ready.notify_one();
        Ok(())
    }
}

impl<T: Clone> BoundedQueue<T> {
    /// Returns a copy of the queued messages, oldest first. Read-only view
    /// for diagnostics; the queue itself is untouched.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.lock().iter().cloned().collect()
    }
}
