//! Storage traits and error types
//!
//! This module defines the persistence seams used by the scrape core and the
//! pipeline, and the errors they can return.

use crate::state::{TargetReport, TargetStatus};
use crate::storage::{RunRecord, RunStatus, TargetOutcomeRecord};
use crate::url::Target;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Existing file {path} has a different header: {detail}")]
    SchemaMismatch { path: String, detail: String },

    #[error("Input file not found: {0}")]
    MissingInput(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Receives the raw records of each successfully completed target
///
/// The retry controller hands records over once per completed target and never
/// retries a failed persist.
pub trait RecordSink {
    fn persist(&mut self, target: &Target, records: &[Value]) -> StorageResult<()>;
}

/// Trait for run ledger backends
///
/// The ledger keeps one row per pipeline run and one row per target outcome.
pub trait Ledger {
    // ===== Run Management =====

    /// Creates a new run in the `Running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status and finish timestamp of a run
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    /// Counts all runs
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Target Outcomes =====

    /// Records how a target ended
    ///
    /// # Arguments
    ///
    /// * `run_id` - The run the target belongs to
    /// * `category` - Top-level category name
    /// * `report` - Final report of the target
    fn record_target(
        &mut self,
        run_id: i64,
        category: &str,
        report: &TargetReport,
    ) -> StorageResult<()>;

    /// Gets all target outcomes of a run, in insertion order
    fn get_target_outcomes(&self, run_id: i64) -> StorageResult<Vec<TargetOutcomeRecord>>;

    /// Counts a run's targets with the given status
    fn count_targets_by_status(&self, run_id: i64, status: TargetStatus) -> StorageResult<u64>;

    /// Sums the persisted item counts of a run
    fn count_items(&self, run_id: i64) -> StorageResult<u64>;
}
