use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Operation counters kept alongside a queue.
///
/// Counters are plain atomics so recording never takes the queue lock a
/// second time; they are bumped while the caller already holds it.
#[derive(Debug, Default)]
pub struct QueueStats {
    enqueued: AtomicU64,
    dequeued: AtomicU64,
    empty_reads: AtomicU64,
}

/// Point-in-time copy of [`QueueStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub enqueued: u64,
    pub dequeued: u64,
    pub empty_reads: u64,
}

impl QueueStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueue(&self) {
        self.enqueued.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn record_dequeue(&self) {
        self.dequeued.fetch_add(1, Ordering::SeqCst);
    }

    /// Dequeue or peek that found nothing
    pub(crate) fn record_empty_read(&self) {
        self.empty_reads.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::SeqCst),
            dequeued: self.dequeued.load(Ordering::SeqCst),
            empty_reads: self.empty_reads.load(Ordering::SeqCst),
        }
    }
}

impl StatsSnapshot {
    /// Elements that went in and have not come out yet.
    ///
    /// Matches the queue size only when no operation is in flight.
    pub fn outstanding(&self) -> u64 {
        self.enqueued.saturating_sub(self.dequeued)
    }
}
