//! Storage module for persisting scrape results
//!
//! This module handles every file the pipeline writes or reads:
//! - Bronze layer: raw JSON per sub-category and the discovered links list
//! - Silver layer: the consolidated flat CSV
//! - Run ledger: SQLite record of runs and per-target outcomes

mod bronze;
mod schema;
mod silver;
mod sqlite;
mod traits;

pub use bronze::{list_bronze_files, read_links_csv, write_links_csv, BronzeStore, LINKS_COLUMN};
pub use silver::{append_to_silver, count_silver_rows, SILVER_FILE_NAME};
pub use sqlite::SqliteLedger;
pub use traits::{Ledger, RecordSink, StorageError, StorageResult};

use crate::state::TargetStatus;

/// Represents a pipeline run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Represents a recorded target outcome
#[derive(Debug, Clone)]
pub struct TargetOutcomeRecord {
    pub run_id: i64,
    pub category: String,
    pub slug: String,
    pub status: TargetStatus,
    pub attempts: u32,
    pub items: u64,
    pub last_page: u32,
    pub error_message: Option<String>,
}

/// Status of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
