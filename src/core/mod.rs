pub mod harness;
pub mod queue;
pub mod report;
pub mod stats;
