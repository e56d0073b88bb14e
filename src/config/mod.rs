//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once at client build time
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a client is built from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::PoolConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
