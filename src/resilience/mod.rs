//! Resilience policies.
//!
//! # Data Flow
//! ```text
//! Request attempt:
//!     → timeout.rs (connect / acquire / response deadlines)
//!     → On failure: retry.rs (check if retryable, sleep fixed backoff, retry)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt phase has a deadline
//! - Retries only for failures that happen before the server could have
//!   processed the request
//! - Backoff is a fixed interval, not exponential: bounded, predictable
//!   latency for a small retry count

pub mod retry;
pub mod timeout;

pub use retry::RetryPolicy;
pub use timeout::TimeoutPolicy;
