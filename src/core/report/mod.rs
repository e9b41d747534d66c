use crate::core::harness::HarnessConfig;
use crate::core::stats::StatsSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome of one harness run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub config: HarnessConfig,
    pub enqueued: u64,
    pub dequeued: u64,
    pub missing: u64,
    pub duplicates: u64,
    pub fifo_violations: u64,
    pub final_size: usize,
    pub stats: StatsSnapshot,
    pub elapsed_ms: u64,
}

impl RunReport {
    /// Every item came out exactly once, in per-producer order, and the
    /// queue was left empty.
    pub fn passed(&self) -> bool {
        self.missing == 0 && self.duplicates == 0 && self.fifo_violations == 0 && self.final_size == 0
    }
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunReport {{ mode: {}, enqueued: {}, dequeued: {}, missing: {}, duplicates: {}, fifo_violations: {}, final_size: {}, empty_reads: {}, elapsed_ms: {}, passed: {} }}",
            self.config.mode,
            self.enqueued,
            self.dequeued,
            self.missing,
            self.duplicates,
            self.fifo_violations,
            self.final_size,
            self.stats.empty_reads,
            self.elapsed_ms,
            self.passed(),
        )
    }
}

/// Append `report` to `path` as a single JSON line, creating the file if needed
pub fn append_report(report: &RunReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path.as_ref())?;

    let json = serde_json::to_string(report)?;
    writeln!(file, "{}", json)?;
    Ok(())
}
