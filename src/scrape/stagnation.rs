//! Stagnation detection
//!
//! Near the end of a result set the API may keep serving records that were
//! already seen. One page without new records proves nothing; a run of them
//! is treated as exhaustion.

/// Default number of consecutive empty-handed pages that ends a scrape
pub const DEFAULT_STAGNATION_THRESHOLD: u32 = 3;

/// What the scrape loop should do after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Terminate,
}

/// Counts consecutive pages that contributed no new records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagnationPolicy {
    threshold: u32,
    consecutive_zero: u32,
}

impl StagnationPolicy {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_zero: 0,
        }
    }

    /// Observes the number of net-new records on the latest page
    ///
    /// Any new record resets the counter. A zero increments it, and the scrape
    /// terminates once the counter reaches the threshold.
    pub fn observe(&mut self, new_unique: usize) -> Action {
        if new_unique > 0 {
            self.consecutive_zero = 0;
            return Action::Continue;
        }

        self.consecutive_zero += 1;
        if self.consecutive_zero >= self.threshold {
            Action::Terminate
        } else {
            Action::Continue
        }
    }

    pub fn consecutive_zero(&self) -> u32 {
        self.consecutive_zero
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for StagnationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_STAGNATION_THRESHOLD)
    }
}
