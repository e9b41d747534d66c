pub mod core;

pub use crate::core::{
    harness::{Harness, HarnessConfig, HarnessError, HarnessMode},
    queue::{FifoQueue, Queue, SafeQueue, new_queue},
    report::{ReportError, RunReport, append_report},
    stats::{QueueStats, StatsSnapshot},
};
