//! Bounded retry with a fixed delay between attempts.
//!
//! Each fetch owns its own attempt budget; nothing is shared between URLs.

use std::time::Duration;

use tracing::{debug, instrument};

use super::AttemptError;
use crate::settings::{HTTP_DELAY, HTTP_RETRIES};

/// Decision on whether to retry a failed fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the specified delay.
    Retry {
        /// How long to wait before retrying.
        delay: Duration,
        /// Which attempt number this will be (1-indexed, so first retry is attempt 2).
        attempt: u32,
    },

    /// Give up.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Attempt budget and delay for one fetch.
///
/// # Default Values
///
/// - `max_attempts`: 2
/// - `delay`: 100 ms
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Fixed sleep between attempts.
    delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_attempts: HTTP_RETRIES,
            delay: HTTP_DELAY,
        }
    }
}

impl FetchPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Determines whether to retry after `attempt` (1-indexed) failed with `error`.
    #[instrument(skip(self, error), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, error: &AttemptError, attempt: u32) -> RetryDecision {
        if !error.is_transient() {
            return RetryDecision::DoNotRetry {
                reason: format!("permanent failure ({error}) - retry would not help"),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        RetryDecision::Retry {
            delay: self.delay,
            attempt: attempt + 1,
        }
    }
}
