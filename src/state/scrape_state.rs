//! Per-attempt scrape state and its terminal outcome

use crate::config::AnonymousRecords;
use crate::scrape::{merge, FetchError, SeenIds, StagnationPolicy};
use serde_json::Value;

/// Why a scrape completed without an outage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    /// The API returned an empty page
    Exhausted,

    /// Too many consecutive pages added nothing new
    Stagnated,
}

/// Mutable state of a single scrape attempt for one target
///
/// A retry always starts from a fresh `ScrapeState`; nothing carries over
/// from a failed attempt.
#[derive(Debug)]
pub struct ScrapeState {
    items: Vec<Value>,
    seen: SeenIds,
    page: u32,
    pages_fetched: u32,
    stagnation: StagnationPolicy,
    anonymous: AnonymousRecords,
}

impl ScrapeState {
    /// Creates the state for page 1
    pub fn new(stagnation_threshold: u32, anonymous: AnonymousRecords) -> Self {
        Self {
            items: Vec::new(),
            seen: SeenIds::default(),
            page: 1,
            pages_fetched: 0,
            stagnation: StagnationPolicy::new(stagnation_threshold),
            anonymous,
        }
    }

    /// The page that will be (or was last) fetched
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn seen(&self) -> &SeenIds {
        &self.seen
    }

    pub fn stagnation(&self) -> &StagnationPolicy {
        &self.stagnation
    }

    pub(crate) fn stagnation_mut(&mut self) -> &mut StagnationPolicy {
        &mut self.stagnation
    }

    pub(crate) fn record_fetch(&mut self) {
        self.pages_fetched += 1;
    }

    /// Merges one page of records and returns how many were net-new
    pub(crate) fn absorb(&mut self, records: Vec<Value>) -> usize {
        let merged = merge(std::mem::take(&mut self.seen), records, self.anonymous);
        self.seen = merged.seen;
        self.items.extend(merged.accepted);
        merged.new_unique
    }

    pub(crate) fn advance(&mut self) {
        self.page += 1;
    }

    /// Ends the attempt as a successful completion
    pub fn complete(self, reason: CompletionReason) -> ScrapeOutcome {
        ScrapeOutcome::Completed {
            last_page: self.page,
            pages_fetched: self.pages_fetched,
            reason,
            items: self.items,
        }
    }

    /// Ends the attempt as an outage on the current page
    pub fn outage(self, error: FetchError) -> ScrapeOutcome {
        ScrapeOutcome::Outage {
            failed_page: self.page,
            pages_fetched: self.pages_fetched,
            error,
            items: self.items,
        }
    }
}

/// Terminal result of one scrape attempt
#[derive(Debug, Clone)]
pub enum ScrapeOutcome {
    /// Natural end of data or stagnation
    Completed {
        items: Vec<Value>,
        last_page: u32,
        pages_fetched: u32,
        reason: CompletionReason,
    },

    /// Transport or parse failure; `items` holds what was collected before it
    Outage {
        items: Vec<Value>,
        failed_page: u32,
        pages_fetched: u32,
        error: FetchError,
    },
}

impl ScrapeOutcome {
    pub fn is_outage(&self) -> bool {
        matches!(self, Self::Outage { .. })
    }

    pub fn items(&self) -> &[Value] {
        match self {
            Self::Completed { items, .. } | Self::Outage { items, .. } => items,
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Self::Completed { items, .. } | Self::Outage { items, .. } => items,
        }
    }

    /// Last page requested: the terminal page on completion, the failed page on outage
    pub fn page(&self) -> u32 {
        match self {
            Self::Completed { last_page, .. } => *last_page,
            Self::Outage { failed_page, .. } => *failed_page,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        match self {
            Self::Completed { pages_fetched, .. } | Self::Outage { pages_fetched, .. } => {
                *pages_fetched
            }
        }
    }
}
