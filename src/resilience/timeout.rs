//! Timeout policy.
//!
//! Three independent deadlines applied to every attempt: establishing the
//! transport connection, obtaining a pooled connection when the pool is
//! saturated, and receiving the complete response. Exceeding one produces the
//! matching failure kind; retrying is the retry policy's business, never this
//! one's.

use std::time::Duration;

use crate::config::TimeoutConfig;

/// Immutable per-attempt deadlines, fixed at client build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    /// Time to establish the transport connection.
    pub connect: Duration,
    /// Time to obtain a pooled connection under saturation.
    pub acquire: Duration,
    /// Time from request sent to full response received.
    pub response: Duration,
}

impl TimeoutPolicy {
    pub fn from_config(config: &TimeoutConfig) -> Self {
        Self {
            connect: Duration::from_millis(config.connect_ms),
            acquire: Duration::from_millis(config.acquire_ms),
            response: Duration::from_millis(config.response_ms),
        }
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::from_config(&TimeoutConfig::default())
    }
}
