//! Final status of one target within a batch
//!
//! This is what the run ledger stores per target.
use std::fmt;

/// Represents how a target's scrape ended after all attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetStatus {
    /// Scrape completed and the records were handed to the sink
    Completed,

    /// Every permitted attempt ended in an outage
    Outage,

    /// Scrape completed but the sink rejected the records
    PersistFailed,
}

impl TargetStatus {
    /// Returns true if the target's records were persisted
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Converts the status to its ledger string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Outage => "outage",
            Self::PersistFailed => "persist_failed",
        }
    }

    /// Parses a status from its ledger string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "outage" => Some(Self::Outage),
            "persist_failed" => Some(Self::PersistFailed),
            _ => None,
        }
    }

    /// Returns all possible target statuses
    pub fn all_statuses() -> [Self; 3] {
        [Self::Completed, Self::Outage, Self::PersistFailed]
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
