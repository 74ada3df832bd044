//! Statistics from the run ledger
//!
//! This module extracts and displays statistics about the latest
//! pipeline run recorded in the ledger.

use crate::state::TargetStatus;
use crate::storage::{Ledger, RunRecord, StorageResult, TargetOutcomeRecord};
use std::collections::BTreeMap;

/// Ledger statistics for one run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    /// The run being described
    pub run: RunRecord,

    /// Runs recorded in the ledger overall
    pub total_runs: u64,

    /// Count of targets by final status
    pub targets_by_status: BTreeMap<&'static str, u64>,

    /// Records persisted during the run
    pub total_items: u64,

    /// Targets per category
    pub targets_by_category: BTreeMap<String, u64>,

    /// Targets that did not complete
    pub failures: Vec<TargetOutcomeRecord>,
}

impl RunStatistics {
    pub fn total_targets(&self) -> u64 {
        self.targets_by_status.values().sum()
    }

    pub fn count(&self, status: TargetStatus) -> u64 {
        self.targets_by_status
            .get(status.to_db_string())
            .copied()
            .unwrap_or(0)
    }
}

/// Loads statistics for the latest run
///
/// # Returns
///
/// * `Ok(None)` - The ledger has no runs yet
/// * `Ok(Some(RunStatistics))` - Statistics of the most recent run
/// * `Err(StorageError)` - Failed to query the ledger
pub fn load_statistics(ledger: &dyn Ledger) -> StorageResult<Option<RunStatistics>> {
    let Some(run) = ledger.get_latest_run()? else {
        return Ok(None);
    };

    let total_runs = ledger.count_runs()?;
    let total_items = ledger.count_items(run.id)?;

    let mut targets_by_status = BTreeMap::new();
    for status in TargetStatus::all_statuses() {
        let count = ledger.count_targets_by_status(run.id, status)?;
        targets_by_status.insert(status.to_db_string(), count);
    }

    let outcomes = ledger.get_target_outcomes(run.id)?;
    let mut targets_by_category: BTreeMap<String, u64> = BTreeMap::new();
    for outcome in &outcomes {
        *targets_by_category.entry(outcome.category.clone()).or_default() += 1;
    }
    let failures = outcomes
        .into_iter()
        .filter(|o| !o.status.is_success())
        .collect();

    Ok(Some(RunStatistics {
        run,
        total_runs,
        targets_by_status,
        total_items,
        targets_by_category,
        failures,
    }))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &RunStatistics) {
    println!("=== Run Statistics ===\n");

    println!("Run:");
    println!("  ID: {} (of {} recorded)", stats.run.id, stats.total_runs);
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Status: {}", stats.run.status.to_db_string());
    println!("  Config hash: {}", stats.run.config_hash);
    println!();

    println!("Targets by Status:");
    let total = stats.total_targets();
    for (status, count) in &stats.targets_by_status {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if !stats.targets_by_category.is_empty() {
        println!("Targets by Category:");
        for (category, count) in &stats.targets_by_category {
            println!("  {}: {}", category, count);
        }
        println!();
    }

    if !stats.failures.is_empty() {
        println!("Failed Targets ({}):", stats.failures.len());
        for failure in &stats.failures {
            println!(
                "  - [{}] {} ({}, page {}, {} attempt(s)): {}",
                failure.category,
                failure.slug,
                failure.status,
                failure.last_page,
                failure.attempts,
                failure.error_message.as_deref().unwrap_or("-")
            );
        }
        println!();
    }

    println!("Products persisted: {}", stats.total_items);
}
