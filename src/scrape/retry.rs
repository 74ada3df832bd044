//! Batch retry controller
//!
//! Runs the pagination loop for each target in list order and decides, per
//! outcome, whether to persist, retry after a cooldown, or give up.
//!
//! # Retry Rules
//!
//! | Outcome | Condition | Action |
//! |---------|-----------|--------|
//! | Completed | - | Persist, count items, advance |
//! | Outage | attempt < max attempts and failed page < page limit | Discard attempt, cool down, retry |
//! | Outage | otherwise | Count one outage, discard attempt, advance |
//!
//! A retry always starts from page 1 with fresh state.

use crate::config::Config;
use crate::scrape::fetcher::PageFetcher;
use crate::scrape::pacing::{Pacer, PauseReason};
use crate::scrape::pagination::{scrape_target, LoopSettings};
use crate::state::{BatchTally, ScrapeOutcome, TargetReport, TargetStatus};
use crate::storage::RecordSink;
use crate::url::Target;
use serde_json::Value;
use std::time::Duration;

/// What to do with an attempt's outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Keep the records
    Accept,
    /// Discard the attempt and scrape the target again
    Retry,
    /// Discard the attempt and move on
    GiveUp,
}

/// Limits on retrying a target after an outage
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per target, including the first
    pub max_attempts: u32,
    /// Outages at or past this page are not retried
    pub retry_page_limit: u32,
    pub cooldown: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.scrape.max_attempts,
            retry_page_limit: config.scrape.retry_page_limit,
            cooldown: config.scrape.retry_cooldown(),
        }
    }

    /// Decides the fate of attempt number `attempt` (1-based)
    pub fn decide(&self, attempt: u32, outcome: &ScrapeOutcome) -> RetryDecision {
        match outcome {
            ScrapeOutcome::Completed { .. } => RetryDecision::Accept,
            ScrapeOutcome::Outage { failed_page, .. }
                if attempt < self.max_attempts && *failed_page < self.retry_page_limit =>
            {
                RetryDecision::Retry
            }
            ScrapeOutcome::Outage { .. } => RetryDecision::GiveUp,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            retry_page_limit: 20,
            cooldown: Duration::from_secs(120),
        }
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub tally: BatchTally,
    /// One report per target, in target order
    pub targets: Vec<TargetReport>,
    /// Persisted records of every completed target, in target order
    pub records: Vec<Value>,
}

/// Sequentially scrapes a list of targets with one-retry-on-shallow-outage
pub struct RetryController<'a, F: ?Sized, P: ?Sized> {
    fetcher: &'a F,
    pacer: &'a P,
    settings: LoopSettings,
    policy: RetryPolicy,
}

impl<'a, F, P> RetryController<'a, F, P>
where
    F: PageFetcher + ?Sized,
    P: Pacer + ?Sized,
{
    pub fn new(fetcher: &'a F, pacer: &'a P, settings: LoopSettings, policy: RetryPolicy) -> Self {
        Self {
            fetcher,
            pacer,
            settings,
            policy,
        }
    }

    /// Visits every target once, in order, and returns the batch results
    pub async fn run<S>(&self, targets: &[Target], sink: &mut S) -> BatchReport
    where
        S: RecordSink + ?Sized,
    {
        let mut report = BatchReport::default();
        let total = targets.len();

        tracing::info!(total, "Scraping sub-categories");

        for (index, target) in targets.iter().enumerate() {
            tracing::info!(
                slug = target.slug(),
                "Processing sub-category {} of {}",
                index + 1,
                total
            );
            let target_report = self.process_target(target, sink, &mut report).await;
            report.targets.push(target_report);
        }

        tracing::info!(
            unique_products = report.tally.unique_products,
            outages = report.tally.outages,
            retries = report.tally.retries,
            "Scraping run finished"
        );

        report
    }

    async fn process_target<S>(
        &self,
        target: &Target,
        sink: &mut S,
        report: &mut BatchReport,
    ) -> TargetReport
    where
        S: RecordSink + ?Sized,
    {
        let mut attempt = 1;

        loop {
            let outcome = scrape_target(self.fetcher, self.pacer, target, &self.settings).await;

            match self.policy.decide(attempt, &outcome) {
                RetryDecision::Accept => {
                    let last_page = outcome.page();
                    let items = outcome.into_items();

                    return match sink.persist(target, &items) {
                        Ok(()) => {
                            tracing::info!(
                                slug = target.slug(),
                                items = items.len(),
                                "Sub-category saved"
                            );
                            report.tally.record_completed(items.len());
                            let count = items.len();
                            report.records.extend(items);
                            TargetReport {
                                target: target.clone(),
                                status: TargetStatus::Completed,
                                attempts: attempt,
                                items: count,
                                last_page,
                                error: None,
                            }
                        }
                        Err(e) => {
                            tracing::error!(slug = target.slug(), error = %e, "Failed to persist sub-category");
                            report.tally.record_persist_failure();
                            TargetReport {
                                target: target.clone(),
                                status: TargetStatus::PersistFailed,
                                attempts: attempt,
                                items: 0,
                                last_page,
                                error: Some(e.to_string()),
                            }
                        }
                    };
                }

                RetryDecision::Retry => {
                    tracing::warn!(
                        slug = target.slug(),
                        attempt,
                        failed_page = outcome.page(),
                        discarded = outcome.items().len(),
                        "Scrape attempt failed, retrying after cooldown"
                    );
                    report.tally.record_retry();
                    self.pacer
                        .pause(self.policy.cooldown, PauseReason::RetryCooldown)
                        .await;
                    attempt += 1;
                }

                RetryDecision::GiveUp => {
                    let error = match &outcome {
                        ScrapeOutcome::Outage { error, .. } => Some(error.to_string()),
                        ScrapeOutcome::Completed { .. } => None,
                    };
                    tracing::error!(
                        slug = target.slug(),
                        attempt,
                        failed_page = outcome.page(),
                        "Skipping sub-category after outage"
                    );
                    report.tally.record_outage();
                    return TargetReport {
                        target: target.clone(),
                        status: TargetStatus::Outage,
                        attempts: attempt,
                        items: 0,
                        last_page: outcome.page(),
                        error,
                    };
                }
            }
        }
    }
}

/// Runs a batch with the given collaborators
pub async fn run_batch<F, P, S>(
    targets: &[Target],
    fetcher: &F,
    pacer: &P,
    sink: &mut S,
    settings: LoopSettings,
    policy: RetryPolicy,
) -> BatchReport
where
    F: PageFetcher + ?Sized,
    P: Pacer + ?Sized,
    S: RecordSink + ?Sized,
{
    RetryController::new(fetcher, pacer, settings, policy)
        .run(targets, sink)
        .await
}
