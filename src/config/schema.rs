//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files, and
//! every value is immutable after the client is built.

use serde::{Deserialize, Serialize};

/// Root configuration for a client instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Connection pool limits and idle eviction.
    pub pool: PoolConfig,

    /// Per-attempt timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum live connections across all routes.
    pub max_total_connections: usize,

    /// Maximum live connections to any single route (scheme, host, port).
    pub max_per_route: usize,

    /// Idle connections older than this are evicted by the sweeper.
    pub max_idle_secs: u64,

    /// How often the idle eviction sweep runs.
    pub sweep_interval_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_total_connections: 100,
            max_per_route: 10,
            max_idle_secs: 10,
            sweep_interval_secs: 2,
        }
    }
}

/// Timeout configuration for the three per-attempt deadlines.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Transport connection establishment timeout in milliseconds.
    pub connect_ms: u64,

    /// Time to obtain a pooled connection when the pool is saturated,
    /// in milliseconds.
    pub acquire_ms: u64,

    /// Time from request sent to full response received (headers and body),
    /// in milliseconds.
    pub response_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 5_000,
            acquire_ms: 3_000,
            response_ms: 5_000,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,

    /// Fixed delay between attempts in milliseconds. Deliberately not
    /// exponential: with a small retry count a fixed interval keeps worst-case
    /// latency bounded and predictable.
    pub backoff_interval_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff_interval_ms: 1_000,
        }
    }
}
