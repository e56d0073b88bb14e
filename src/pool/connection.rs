//! Pooled connection guard.
//!
//! # Responsibilities
//! - Own one live HTTP/1.1 connection while a request is in flight
//! - Release pool capacity when dropped without an explicit release
//!
//! # Design Decisions
//! - Drop-without-release discards the connection rather than returning it to
//!   the idle set: a cancelled or failed call leaves the transport in an
//!   unknown state, and capacity must still be freed

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::client::conn::http1::SendRequest;
use hyper::{Request, Response};

use crate::error::{ClientError, ClientResult};
use crate::pool::manager::PoolShared;
use crate::pool::Route;
use crate::transport;

/// One live transport connection, exclusively held by a single in-flight
/// request. Never shared between concurrent requests.
pub struct PooledConnection {
    inner: Option<Inner>,
    shared: Arc<PoolShared>,
}

pub(crate) struct Inner {
    pub(crate) route: Route,
    pub(crate) sender: SendRequest<Full<Bytes>>,
    pub(crate) created_at: Instant,
}

impl PooledConnection {
    pub(crate) fn new(
        shared: Arc<PoolShared>,
        route: Route,
        sender: SendRequest<Full<Bytes>>,
        created_at: Instant,
    ) -> Self {
        Self {
            inner: Some(Inner {
                route,
                sender,
                created_at,
            }),
            shared,
        }
    }

    /// Send one request over this connection.
    pub(crate) async fn send_request(
        &mut self,
        request: Request<Full<Bytes>>,
    ) -> ClientResult<Response<Incoming>> {
        match self.inner.as_mut() {
            Some(inner) => inner
                .sender
                .send_request(request)
                .await
                .map_err(transport::classify_hyper_error),
            // Unreachable through the executor; kept as a typed error rather
            // than a panic.
            None => Err(ClientError::Io(std::io::Error::other(
                "connection used after release",
            ))),
        }
    }

    /// Take ownership of the live parts for return to the idle set.
    pub(crate) fn take(&mut self) -> Option<Inner> {
        self.inner.take()
    }

    pub(crate) fn route(&self) -> Option<&Route> {
        self.inner.as_ref().map(|inner| &inner.route)
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            self.shared.discard(&inner.route);
            tracing::trace!(route = %inner.route, "pooled connection discarded");
        }
    }
}

impl std::fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledConnection")
            .field("route", &self.route())
            .field("held", &self.inner.is_some())
            .finish()
    }
}
