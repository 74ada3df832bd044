//! Injectable waits
//!
//! The scrape loop waits between pages and the retry controller waits before a
//! retry. Both go through `Pacer` so tests can record the waits instead of
//! sleeping through them.

use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Which wait is being requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseReason {
    /// Fixed delay before requesting the next page
    BetweenPages,

    /// Cooldown before retrying a target after an outage
    RetryCooldown,
}

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration, reason: PauseReason);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration, reason: PauseReason) {
        if duration.is_zero() {
            return;
        }
        tracing::debug!(?reason, ?duration, "Pausing");
        tokio::time::sleep(duration).await;
    }
}

/// Records requested waits and returns immediately
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<(PauseReason, Duration)>>,
}

impl RecordingPacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All waits requested so far, in order
    pub fn pauses(&self) -> Vec<(PauseReason, Duration)> {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of waits requested for `reason`
    pub fn count(&self, reason: PauseReason) -> usize {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(r, _)| *r == reason)
            .count()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration, reason: PauseReason) {
        self.pauses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((reason, duration));
    }
}
