//! Configuration loading from disk.
//!
//! Reads a TOML file, deserializes it into [`ClientConfig`] and runs the
//! semantic validation before handing the result to the client builder.

use std::path::Path;

use thiserror::Error;

use crate::config::schema::ClientConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Failure to produce a usable configuration from a file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The values are syntactically fine but semantically rejected.
    #[error("invalid configuration: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read, parse and validate a client configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: ClientConfig = toml::from_str(&content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
