//! Route identity.
//!
//! A pooled connection is scoped to the (scheme, host, port) triple it was
//! dialed for; the pool's per-route cap and idle sets are keyed by this type.

use url::Url;

use crate::error::BindingError;

/// The (scheme, host, port) triple a pooled connection is scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Route {
    scheme: String,
    host: String,
    port: u16,
}

impl Route {
    /// Derive the route for a request URL.
    ///
    /// Only `http` is accepted; TLS is an external collaborator the core does
    /// not implement.
    pub fn from_url(url: &Url) -> Result<Self, BindingError> {
        if url.scheme() != "http" {
            return Err(BindingError::UnsupportedScheme(url.scheme().to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| BindingError::InvalidUrl(format!("missing host in `{}`", url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| BindingError::InvalidUrl(format!("missing port in `{}`", url)))?;
        Ok(Self {
            scheme: url.scheme().to_string(),
            host: host.to_string(),
            port,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}
