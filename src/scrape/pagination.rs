//! Per-target pagination loop
//!
//! Drives the fetcher page by page for a single target:
//!
//! ```text
//! Fetching(n) --Err--------------------> Outage(items, n)
//!             --Ok([])-----------------> Completed(items)        (exhausted)
//!             --Ok(records)--> merge --> stagnation check
//!                                          Terminate -> Completed (stagnated)
//!                                          Continue  -> pause -> Fetching(n + 1)
//! ```

use crate::config::{AnonymousRecords, Config};
use crate::scrape::fetcher::PageFetcher;
use crate::scrape::pacing::{Pacer, PauseReason};
use crate::scrape::stagnation::{Action, DEFAULT_STAGNATION_THRESHOLD};
use crate::state::{CompletionReason, ScrapeOutcome, ScrapeState};
use crate::url::Target;
use std::time::Duration;

/// Tuning for a single scrape attempt
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub page_size: u32,
    pub page_delay: Duration,
    pub stagnation_threshold: u32,
    pub anonymous_records: AnonymousRecords,
}

impl LoopSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.api.page_size,
            page_delay: config.scrape.page_delay(),
            stagnation_threshold: config.scrape.stagnation_threshold,
            anonymous_records: config.scrape.anonymous_records,
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            page_size: 50,
            page_delay: Duration::from_secs(3),
            stagnation_threshold: DEFAULT_STAGNATION_THRESHOLD,
            anonymous_records: AnonymousRecords::default(),
        }
    }
}

/// Scrapes every page of `target` until the data ends, stagnates, or fails
///
/// Fetch errors never escape this function; they become
/// `ScrapeOutcome::Outage` carrying the records collected before the failure.
pub async fn scrape_target<F, P>(
    fetcher: &F,
    pacer: &P,
    target: &Target,
    settings: &LoopSettings,
) -> ScrapeOutcome
where
    F: PageFetcher + ?Sized,
    P: Pacer + ?Sized,
{
    let slug = target.slug();
    let mut state = ScrapeState::new(settings.stagnation_threshold, settings.anonymous_records);

    tracing::info!(slug, "Starting full scrape");

    loop {
        let page = state.page();
        state.record_fetch();

        let records = match fetcher.fetch(slug, page, settings.page_size).await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!(slug, page, %error, "Outage while scraping page");
                return state.outage(error);
            }
        };

        if records.is_empty() {
            tracing::info!(slug, page, total = state.items().len(), "No more data, scrape complete");
            return state.complete(CompletionReason::Exhausted);
        }

        let received = records.len();
        let new_items = state.absorb(records);
        tracing::info!(slug, page, received, new_items, "Scraped page");

        match state.stagnation_mut().observe(new_items) {
            Action::Terminate => {
                tracing::info!(
                    slug,
                    page,
                    total = state.items().len(),
                    "Stopping after {} consecutive pages with no new products",
                    state.stagnation().threshold()
                );
                return state.complete(CompletionReason::Stagnated);
            }
            Action::Continue => {
                let stalled = state.stagnation().consecutive_zero();
                if stalled > 0 {
                    tracing::debug!(
                        slug,
                        page,
                        "Stagnation detected ({}/{})",
                        stalled,
                        state.stagnation().threshold()
                    );
                }
            }
        }

        pacer
            .pause(settings.page_delay, PauseReason::BetweenPages)
            .await;
        state.advance();
    }
}
