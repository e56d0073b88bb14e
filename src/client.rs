//! Client construction and endpoint binding.
//!
//! # Responsibilities
//! - Validate configuration and base URL once, at startup
//! - Wire the pool, timeout policy and retry policy into one executor
//! - Turn endpoint descriptors into callable operations
//!
//! # Design Decisions
//! - No ambient singletons: the pool is owned by the executor, which is
//!   shared by every operation bound from the same client
//! - Everything behind the builder is immutable after `build`

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use crate::binding::{EndpointDescriptor, Operation};
use crate::codec::{Codec, JsonCodec};
use crate::config::validation::validate_config;
use crate::config::{load_config, ClientConfig};
use crate::error::{BindingError, ClientError, ClientResult};
use crate::executor::RequestExecutor;
use crate::pool::{ConnectionPool, PoolStats, Route};
use crate::resilience::{RetryPolicy, TimeoutPolicy};

/// Declarative HTTP client: binds endpoint descriptors into operations that
/// share one pool, one timeout policy and one retry policy.
pub struct Client<C: Codec = JsonCodec> {
    base_url: Url,
    executor: Arc<RequestExecutor>,
    codec: C,
}

impl Client<JsonCodec> {
    /// Start building a client for the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder<JsonCodec> {
        ClientBuilder {
            base_url: base_url.into(),
            config: ClientConfig::default(),
            codec: JsonCodec,
        }
    }
}

impl<C: Codec> Client<C> {
    /// Bind an endpoint descriptor into a callable operation with response
    /// type `Res`. Descriptors are bound once at startup and shared.
    pub fn bind<Res>(&self, descriptor: EndpointDescriptor) -> Operation<Res, C>
    where
        Res: DeserializeOwned + Default,
    {
        Operation::new(
            descriptor,
            self.base_url.clone(),
            Arc::clone(&self.executor),
            self.codec.clone(),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Pool counters, for observability and tests.
    pub fn pool_stats(&self) -> PoolStats {
        self.executor.pool_stats()
    }
}

/// Builder for [`Client`]. Configuration is validated at `build`.
pub struct ClientBuilder<C: Codec> {
    base_url: String,
    config: ClientConfig,
    codec: C,
}

impl<C: Codec> ClientBuilder<C> {
    /// Replace the default configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the configuration from a TOML file, replacing the defaults.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> ClientResult<Self> {
        self.config =
            load_config(path).map_err(|err| ClientError::Config(err.to_string()))?;
        Ok(self)
    }

    /// Swap the body codec (JSON by default).
    pub fn codec<C2: Codec>(self, codec: C2) -> ClientBuilder<C2> {
        ClientBuilder {
            base_url: self.base_url,
            config: self.config,
            codec,
        }
    }

    /// Validate everything and assemble the client. Spawns the pool's idle
    /// eviction sweeper, so this must run inside a tokio runtime.
    pub fn build(self) -> ClientResult<Client<C>> {
        if let Err(errors) = validate_config(&self.config) {
            let joined = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ClientError::Config(joined));
        }

        let base_url = Url::parse(&self.base_url)
            .map_err(|err| BindingError::InvalidUrl(err.to_string()))?;
        // Fail unsupported schemes and authority-less URLs at startup, not on
        // the first call.
        Route::from_url(&base_url)?;

        let timeouts = TimeoutPolicy::from_config(&self.config.timeouts);
        let retry = RetryPolicy::from_config(&self.config.retries);
        let pool = ConnectionPool::new(&self.config.pool, timeouts.connect, timeouts.acquire);

        tracing::debug!(
            base_url = %base_url,
            max_total = self.config.pool.max_total_connections,
            max_per_route = self.config.pool.max_per_route,
            max_retries = self.config.retries.max_retries,
            "client built"
        );

        Ok(Client {
            base_url,
            executor: Arc::new(RequestExecutor::new(pool, timeouts, retry)),
            codec: self.codec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_invalid_base_url() {
        let result = Client::builder("not a url").build();
        assert!(matches!(
            result,
            Err(ClientError::Binding(BindingError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn rejects_https_base_url() {
        let result = Client::builder("https://example.com").build();
        assert!(matches!(
            result,
            Err(ClientError::Binding(BindingError::UnsupportedScheme(_)))
        ));
    }

    #[tokio::test]
    async fn rejects_invalid_config() {
        let mut config = ClientConfig::default();
        config.pool.max_per_route = 0;
        let result = Client::builder("http://example.com").config(config).build();
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn builds_from_config_file() {
        let path = std::env::temp_dir()
            .join(format!("restbind-client-{}.toml", std::process::id()));
        std::fs::write(&path, "[retries]\nmax_retries = 4\n").unwrap();

        let builder = Client::builder("http://example.com")
            .config_file(&path)
            .unwrap();
        assert_eq!(builder.config.retries.max_retries, 4);
        assert!(builder.build().is_ok());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn config_file_with_bad_values_is_rejected() {
        let path = std::env::temp_dir()
            .join(format!("restbind-client-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[pool]\nmax_per_route = 0\n").unwrap();

        let result = Client::builder("http://example.com").config_file(&path);
        assert!(matches!(result, Err(ClientError::Config(_))));
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn builds_with_defaults() {
        let client = Client::builder("http://example.com").build().unwrap();
        assert_eq!(client.base_url().as_str(), "http://example.com/");
        assert_eq!(client.pool_stats().live, 0);
    }
}
