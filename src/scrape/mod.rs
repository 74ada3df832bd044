//! Scrape module: pagination, de-duplication and retry control
//!
//! This module contains the core scraping logic, including:
//! - Fetching one page of the listing API at a time
//! - Merging pages while dropping already-seen products
//! - Detecting stagnation near the end of a result set
//! - Driving a target to a terminal outcome
//! - Retrying shallow outages once per target across a batch

mod dedup;
mod fetcher;
mod pacing;
mod pagination;
mod retry;
mod stagnation;

pub use dedup::{merge, record_id, Merged, SeenIds, ID_FIELD};
pub use fetcher::{build_http_client, parse_listing, ApiFetcher, FetchError, PageFetcher, PageResult};
pub use pacing::{Pacer, PauseReason, RecordingPacer, TokioPacer};
pub use pagination::{scrape_target, LoopSettings};
pub use retry::{run_batch, BatchReport, RetryController, RetryDecision, RetryPolicy};
pub use stagnation::{Action, StagnationPolicy, DEFAULT_STAGNATION_THRESHOLD};
