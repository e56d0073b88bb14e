//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, caps >= 1)
//! - Check cap consistency (per-route cap cannot exceed the global cap)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into a client

use thiserror::Error;

use crate::config::schema::ClientConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("pool.max_per_route ({per_route}) exceeds pool.max_total_connections ({total})")]
    PerRouteExceedsTotal { per_route: usize, total: usize },
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pool.max_total_connections == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "pool.max_total_connections",
        });
    }
    if config.pool.max_per_route == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "pool.max_per_route",
        });
    }
    if config.pool.max_per_route > config.pool.max_total_connections {
        errors.push(ValidationError::PerRouteExceedsTotal {
            per_route: config.pool.max_per_route,
            total: config.pool.max_total_connections,
        });
    }
    if config.pool.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "pool.sweep_interval_secs",
        });
    }
    if config.timeouts.connect_ms == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "timeouts.connect_ms",
        });
    }
    if config.timeouts.acquire_ms == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "timeouts.acquire_ms",
        });
    }
    if config.timeouts.response_ms == 0 {
        errors.push(ValidationError::ZeroValue {
            field: "timeouts.response_ms",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
