//! Batch-level counters and per-target reports

use crate::state::TargetStatus;
use crate::url::Target;

/// Counters for one RetryController pass over a target list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTally {
    /// Records persisted across all completed targets
    pub unique_products: usize,

    /// Targets abandoned after their final outage
    pub outages: usize,

    /// Cooldown-and-retry cycles performed
    pub retries: usize,

    /// Targets whose records were persisted
    pub completed_targets: usize,

    /// Targets that completed but could not be persisted
    pub persist_failures: usize,
}

impl BatchTally {
    pub fn record_completed(&mut self, items: usize) {
        self.completed_targets += 1;
        self.unique_products += items;
    }

    pub fn record_outage(&mut self) {
        self.outages += 1;
    }

    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    pub fn record_persist_failure(&mut self) {
        self.persist_failures += 1;
    }

    /// Targets that reached a terminal status
    pub fn targets_visited(&self) -> usize {
        self.completed_targets + self.outages + self.persist_failures
    }

    /// Folds another batch's counters into this one
    pub fn absorb(&mut self, other: &BatchTally) {
        self.unique_products += other.unique_products;
        self.outages += other.outages;
        self.retries += other.retries;
        self.completed_targets += other.completed_targets;
        self.persist_failures += other.persist_failures;
    }
}

/// How a single target ended
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: Target,
    pub status: TargetStatus,
    /// Scrape attempts made (1 or 2 with the default retry budget)
    pub attempts: u32,
    /// Records kept for this target; zero unless completed
    pub items: usize,
    /// Terminal page of the final attempt
    pub last_page: u32,
    pub error: Option<String>,
}
