use crate::core::queue::{SafeQueue, new_queue};
use crate::core::report::{ReportError, RunReport};
use crate::core::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid harness config: {0}")]
    InvalidConfig(String),

    #[error("{role} thread {index} panicked")]
    WorkerPanicked { role: &'static str, index: usize },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// How producers and consumers are scheduled against each other
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HarnessMode {
    /// All producers finish before any consumer starts
    Phased,
    /// Producers and consumers run at the same time
    #[default]
    Mixed,
}

impl Display for HarnessMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessMode::Phased => write!(f, "phased"),
            HarnessMode::Mixed => write!(f, "mixed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub producers: usize,
    pub consumers: usize,
    pub items_per_producer: u64,
    pub mode: HarnessMode,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            producers: 4,
            consumers: 4,
            items_per_producer: 2_500,
            mode: HarnessMode::default(),
        }
    }
}

impl HarnessConfig {
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.producers == 0 {
            return Err(HarnessError::InvalidConfig("producers must be at least 1".into()));
        }
        if self.consumers == 0 {
            return Err(HarnessError::InvalidConfig("consumers must be at least 1".into()));
        }
        if self.items_per_producer == 0 {
            return Err(HarnessError::InvalidConfig(
                "items_per_producer must be at least 1".into(),
            ));
        }
        if self.total_items().is_none() {
            return Err(HarnessError::InvalidConfig(format!(
                "{} producers x {} items overflows u64",
                self.producers, self.items_per_producer
            )));
        }
        Ok(())
    }

    /// Total number of items the producers will enqueue
    pub fn total_items(&self) -> Option<u64> {
        u64::try_from(self.producers)
            .ok()?
            .checked_mul(self.items_per_producer)
    }
}

/// Drives a shared `Queue<u64>` from many threads and checks that every item
/// comes out exactly once and in per-producer order.
///
/// Item values are `producer * items_per_producer + seq`, so the producer and
/// sequence number can be recovered from any dequeued value.
pub struct Harness {
    config: HarnessConfig,
    total: u64,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        let total = config.total_items().unwrap_or_default();
        Ok(Self { config, total })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run against a fresh queue
    pub fn run(&self) -> Result<RunReport, HarnessError> {
        self.run_on(new_queue())
    }

    /// Run against `queue`, which should start empty
    pub fn run_on(&self, queue: SafeQueue<u64>) -> Result<RunReport, HarnessError> {
        info!(
            mode = %self.config.mode,
            producers = self.config.producers,
            consumers = self.config.consumers,
            total = self.total,
            "starting harness run"
        );
        let start = Instant::now();

        let observed = match self.config.mode {
            HarnessMode::Phased => {
                let producers = self.spawn_producers(&queue, None);
                join_all(producers, "producer")?;
                debug!(size = queue.size(), "producers finished");
                let consumers = self.spawn_drain_consumers(&queue);
                join_all(consumers, "consumer")?
            }
            HarnessMode::Mixed => {
                let barrier = Arc::new(Barrier::new(self.config.producers + self.config.consumers));
                let producers = self.spawn_producers(&queue, Some(barrier.clone()));
                let consumers = self.spawn_polling_consumers(&queue, barrier);
                join_all(producers, "producer")?;
                join_all(consumers, "consumer")?
            }
        };

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let report = self.verify(&observed, queue.size(), queue.stats(), elapsed_ms);
        if report.passed() {
            info!(elapsed_ms, "harness run passed");
        } else {
            warn!(
                missing = report.missing,
                duplicates = report.duplicates,
                fifo_violations = report.fifo_violations,
                final_size = report.final_size,
                "harness run failed"
            );
        }
        Ok(report)
    }

    fn spawn_producers(
        &self,
        queue: &SafeQueue<u64>,
        barrier: Option<Arc<Barrier>>,
    ) -> Vec<JoinHandle<()>> {
        let barrier =
            barrier.unwrap_or_else(|| Arc::new(Barrier::new(self.config.producers)));
        let per_producer = self.config.items_per_producer;

        (0..self.config.producers)
            .map(|index| {
                let queue = queue.clone();
                let barrier = barrier.clone();
                let base = index as u64 * per_producer;
                thread::spawn(move || {
                    barrier.wait();
                    for seq in 0..per_producer {
                        queue.enqueue(base + seq);
                    }
                })
            })
            .collect()
    }

    /// Consumers that stop at the first empty read. Only correct once every
    /// producer has been joined.
    fn spawn_drain_consumers(&self, queue: &SafeQueue<u64>) -> Vec<JoinHandle<Vec<u64>>> {
        let barrier = Arc::new(Barrier::new(self.config.consumers));

        (0..self.config.consumers)
            .map(|_| {
                let queue = queue.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut taken = Vec::new();
                    while let Some(item) = queue.dequeue() {
                        taken.push(item);
                    }
                    taken
                })
            })
            .collect()
    }

    /// Consumers that poll until the shared tally reaches the expected total
    fn spawn_polling_consumers(
        &self,
        queue: &SafeQueue<u64>,
        barrier: Arc<Barrier>,
    ) -> Vec<JoinHandle<Vec<u64>>> {
        let tally = Arc::new(AtomicU64::new(0));
        let total = self.total;

        (0..self.config.consumers)
            .map(|_| {
                let queue = queue.clone();
                let barrier = barrier.clone();
                let tally = tally.clone();
                thread::spawn(move || {
                    barrier.wait();
                    let mut taken = Vec::new();
                    while tally.load(Ordering::SeqCst) < total {
                        match queue.dequeue() {
                            Some(item) => {
                                taken.push(item);
                                tally.fetch_add(1, Ordering::SeqCst);
                            }
                            None => thread::yield_now(),
                        }
                    }
                    taken
                })
            })
            .collect()
    }

    fn verify(
        &self,
        observed: &[Vec<u64>],
        final_size: usize,
        stats: StatsSnapshot,
        elapsed_ms: u64,
    ) -> RunReport {
        let per_producer = self.config.items_per_producer;
        let mut counts = vec![0u32; usize::try_from(self.total).unwrap_or(usize::MAX)];
        let mut duplicates = 0u64;
        let mut fifo_violations = 0u64;
        let mut dequeued = 0u64;

        for taken in observed {
            let mut last_seq: Vec<Option<u64>> = vec![None; self.config.producers];
            for &item in taken {
                dequeued += 1;
                let slot = usize::try_from(item)
                    .ok()
                    .and_then(|index| counts.get_mut(index));
                match slot {
                    Some(count) => {
                        *count += 1;
                        if *count > 1 {
                            duplicates += 1;
                        }
                    }
                    // Value no producer could have made
                    None => {
                        duplicates += 1;
                        continue;
                    }
                }

                // item < total here, so the producer index fits in usize
                let producer = usize::try_from(item / per_producer).unwrap_or(usize::MAX);
                let seq = item % per_producer;
                let Some(last) = last_seq.get_mut(producer) else {
                    continue;
                };
                if let Some(prev) = *last {
                    if seq <= prev {
                        fifo_violations += 1;
                    }
                }
                *last = Some(seq);
            }
        }

        let missing = counts.iter().filter(|&&count| count == 0).count() as u64;

        RunReport {
            config: self.config.clone(),
            enqueued: stats.enqueued,
            dequeued,
            missing,
            duplicates,
            fifo_violations,
            final_size,
            stats,
            elapsed_ms,
        }
    }
}

fn join_all<R>(handles: Vec<JoinHandle<R>>, role: &'static str) -> Result<Vec<R>, HarnessError> {
    handles
        .into_iter()
        .enumerate()
        .map(|(index, handle)| {
            handle
                .join()
                .map_err(|_| HarnessError::WorkerPanicked { role, index })
        })
        .collect()
}
