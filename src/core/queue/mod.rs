use crate::core::stats::{QueueStats, StatsSnapshot};
use parking_lot::RwLock;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// First-in first-out container that is safe to share between threads.
///
/// Items go in at the tail and come out at the head. Reads that find the
/// queue empty return `None` instead of blocking or failing.
pub trait FifoQueue<T>: Send + Sync {
    /// Append an item at the tail
    fn enqueue(&self, item: T);

    /// Remove and return the head, or `None` when empty
    fn dequeue(&self) -> Option<T>;

    /// Copy of the head without removing it
    fn peek(&self) -> Option<T>
    where
        T: Clone;

    fn is_empty(&self) -> bool;

    /// There is no capacity limit, so this is always `false`
    fn is_full(&self) -> bool;

    fn size(&self) -> usize;

    /// Dequeue, reporting absence as `(T::default(), false)`
    fn dequeue_or_default(&self) -> (T, bool)
    where
        T: Default,
    {
        match self.dequeue() {
            Some(item) => (item, true),
            None => (T::default(), false),
        }
    }

    /// Peek, reporting absence as `(T::default(), false)`
    fn peek_or_default(&self) -> (T, bool)
    where
        T: Clone + Default,
    {
        match self.peek() {
            Some(item) => (item, true),
            None => (T::default(), false),
        }
    }
}

/// Unbounded FIFO queue guarded by a single reader/writer lock
///
/// Shared reads are recursive so a reader nested inside `peek_with` is never
/// parked behind a waiting writer.
pub struct Queue<T> {
    items: RwLock<VecDeque<T>>,
    stats: QueueStats,
}

impl<T> Queue<T> {
    /// Create a new, empty queue
    pub fn new() -> Self {
        Self {
            items: RwLock::new(VecDeque::new()),
            stats: QueueStats::new(),
        }
    }

    /// Create an empty queue with room for `capacity` items before the
    /// backing storage reallocates. This is not a limit.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: RwLock::new(VecDeque::with_capacity(capacity)),
            stats: QueueStats::new(),
        }
    }

    pub fn enqueue(&self, item: T) {
        let mut items = self.items.write();
        let len_before = items.len();
        items.push_back(item);
        self.stats.record_enqueue();
        debug_assert_eq!(items.len(), len_before + 1, "enqueue must grow the queue by one");
        trace!(size = items.len(), "enqueue");
    }

    pub fn dequeue(&self) -> Option<T> {
        let mut items = self.items.write();
        let len_before = items.len();
        let result = items.pop_front();
        match result {
            Some(_) => {
                self.stats.record_dequeue();
                debug_assert_eq!(items.len(), len_before - 1, "dequeue must shrink the queue by one");
                trace!(size = items.len(), "dequeue");
            }
            None => {
                self.stats.record_empty_read();
                trace!("dequeue on empty queue");
            }
        }
        result
    }

    /// Look at the head by reference while holding the shared lock.
    ///
    /// `f` may read this queue again but must not enqueue or dequeue.
    pub fn peek_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let items = self.items.read_recursive();
        match items.front() {
            Some(head) => Some(f(head)),
            None => {
                self.stats.record_empty_read();
                trace!("peek on empty queue");
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.read_recursive().is_empty()
    }

    pub fn is_full(&self) -> bool {
        false
    }

    pub fn size(&self) -> usize {
        self.items.read_recursive().len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl<T: Clone> Queue<T> {
    pub fn peek(&self) -> Option<T> {
        self.peek_with(T::clone)
    }

    /// Head-to-tail copy of the current contents
    pub fn snapshot(&self) -> Vec<T> {
        self.items.read_recursive().iter().cloned().collect()
    }
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let queue = Self::new();
        for item in iter {
            queue.enqueue(item);
        }
        queue
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("size", &self.size())
            .field("stats", &self.stats())
            .finish()
    }
}

impl<T: Send + Sync> FifoQueue<T> for Queue<T> {
    fn enqueue(&self, item: T) {
        Queue::enqueue(self, item)
    }

    fn dequeue(&self) -> Option<T> {
        Queue::dequeue(self)
    }

    fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        Queue::peek(self)
    }

    fn is_empty(&self) -> bool {
        Queue::is_empty(self)
    }

    fn is_full(&self) -> bool {
        Queue::is_full(self)
    }

    fn size(&self) -> usize {
        Queue::size(self)
    }
}

/// Shared handle to a queue
pub type SafeQueue<T> = Arc<Queue<T>>;

/// Create an empty queue ready to be cloned across threads
pub fn new_queue<T>() -> SafeQueue<T> {
    Arc::new(Queue::new())
}
