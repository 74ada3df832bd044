//! Output module for run reports
//!
//! This module handles:
//! - Formatting the summary printed at the end of a pipeline run
//! - Loading and printing ledger statistics for `--stats`

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, RunStatistics};
pub use summary::{format_run_summary, print_run_summary, CategorySummary, PipelineSummary};
