//! State module for tracking scrape progress
//!
//! All mutable scrape state is held in explicit values owned by the component
//! that changes it.
//!
//! # Components
//!
//! - `ScrapeState`: accumulated records, seen identifiers, page and stagnation counter for one attempt
//! - `ScrapeOutcome`: terminal result of an attempt (`Completed` or `Outage`)
//! - `BatchTally`: counters across every target of a batch
//! - `TargetStatus`: final status of a target as stored in the ledger

mod batch_tally;
mod scrape_state;
mod target_status;

// Re-export main types
pub use batch_tally::{BatchTally, TargetReport};
pub use scrape_state::{CompletionReason, ScrapeOutcome, ScrapeState};
pub use target_status::TargetStatus;
