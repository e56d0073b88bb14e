//! Retry policy.
//!
//! # Responsibilities
//! - Decide, per failed attempt, whether another attempt may run
//! - Supply the backoff delay inserted before the next attempt
//!
//! # Design Decisions
//! - Only connection-level failures are retryable; a response timeout may
//!   mean the server already processed the request, and a blind retry would
//!   risk duplicate side effects for non-idempotent verbs
//! - Fixed-interval backoff, not exponential: with 1-3 retries the fixed
//!   interval keeps worst-case latency bounded and predictable

use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::ClientError;

/// Bounded, fixed-interval retry policy, immutable after client build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_interval: Duration) -> Self {
        Self {
            max_retries,
            backoff_interval,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.backoff_interval_ms),
        )
    }

    /// Whether attempt `attempt_number` (1-based) may be followed by another.
    pub fn should_retry(&self, attempt_number: u32, error: &ClientError) -> bool {
        attempt_number <= self.max_retries && error.is_retryable()
    }

    /// Delay to sleep before the attempt after `attempt_number`.
    pub fn backoff_delay(&self, _attempt_number: u32) -> Duration {
        self.backoff_interval
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
