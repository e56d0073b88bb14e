//! Request execution engine.
//!
//! # Responsibilities
//! - Drive one or more attempts for a resolved request through the pool
//! - Enforce the response deadline per attempt
//! - Release reusable connections, discard failed ones
//! - Consult the retry policy between attempts and sleep the backoff
//!
//! # Design Decisions
//! - The attempt loop is always bounded by `max_retries`
//! - A timed-out or failed attempt discards its connection; its state on the
//!   wire is unknown and it must never re-enter the idle set
//! - Backoff sleeps suspend only the retrying call, never the pool

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderMap, HeaderValue, HOST};
use hyper::{Request, StatusCode};
use tokio::time;

use crate::binding::ResolvedRequest;
use crate::error::{BindingError, ClientError, ClientResult};
use crate::pool::{ConnectionPool, PoolStats, Route};
use crate::resilience::{RetryPolicy, TimeoutPolicy};
use crate::transport;

/// One complete HTTP response: status, headers, fully-collected body bytes.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes resolved requests over the pool under the timeout and retry
/// policies. One terminal outcome per call; retries happen internally.
pub struct RequestExecutor {
    pool: ConnectionPool,
    timeouts: TimeoutPolicy,
    retry: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(pool: ConnectionPool, timeouts: TimeoutPolicy, retry: RetryPolicy) -> Self {
        Self {
            pool,
            timeouts,
            retry,
        }
    }

    /// Execute the request, retrying retryable connection-level failures up
    /// to the policy's bound, and return the response or the last failure.
    pub async fn execute(&self, request: &ResolvedRequest) -> ClientResult<RawResponse> {
        let route = Route::from_url(&request.url)?;
        let mut attempt_number: u32 = 1;

        loop {
            match self.attempt(&route, request).await {
                Ok(response) => {
                    tracing::debug!(
                        status = response.status.as_u16(),
                        attempt = attempt_number,
                        "request completed"
                    );
                    return Ok(response);
                }
                Err(error) if self.retry.should_retry(attempt_number, &error) => {
                    let delay = self.retry.backoff_delay(attempt_number);
                    tracing::warn!(
                        attempt = attempt_number,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "attempt failed, backing off before retry"
                    );
                    time::sleep(delay).await;
                    attempt_number += 1;
                }
                Err(error) => {
                    tracing::debug!(attempt = attempt_number, error = %error, "request failed");
                    return Err(error);
                }
            }
        }
    }

    /// One attempt: acquire, send, collect the body, release or discard.
    async fn attempt(&self, route: &Route, request: &ResolvedRequest) -> ClientResult<RawResponse> {
        let mut connection = self.pool.acquire(route).await?;
        let http_request = build_http_request(request)?;

        let outcome = time::timeout(self.timeouts.response, async {
            let response = connection.send_request(http_request).await?;
            let (parts, body) = response.into_parts();
            let bytes = body
                .collect()
                .await
                .map_err(transport::classify_hyper_error)?
                .to_bytes();
            Ok::<_, ClientError>(RawResponse {
                status: parts.status,
                headers: parts.headers,
                body: bytes,
            })
        })
        .await;

        match outcome {
            Ok(Ok(response)) => {
                self.pool.release(connection);
                Ok(response)
            }
            Ok(Err(error)) => {
                // Dropping the guard discards the connection.
                drop(connection);
                Err(error)
            }
            Err(_) => {
                drop(connection);
                Err(ClientError::ResponseTimeout(self.timeouts.response))
            }
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

/// Convert a resolved request into the wire request hyper sends.
fn build_http_request(request: &ResolvedRequest) -> ClientResult<Request<Full<Bytes>>> {
    // Origin-form URI; the connection is already scoped to the route.
    let mut uri = request.url.path().to_string();
    if let Some(query) = request.url.query() {
        uri.push('?');
        uri.push_str(query);
    }

    let mut http_request = Request::builder()
        .method(request.method.clone())
        .uri(uri)
        .body(Full::new(request.body.clone()))
        .map_err(|err| ClientError::Binding(BindingError::InvalidUrl(err.to_string())))?;
    *http_request.headers_mut() = request.headers.clone();

    if !http_request.headers().contains_key(HOST) {
        let host = request
            .url
            .host_str()
            .ok_or_else(|| BindingError::InvalidUrl(format!("missing host in `{}`", request.url)))?;
        let authority = match request.url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };
        let value = HeaderValue::from_str(&authority)
            .map_err(|err| ClientError::Binding(BindingError::InvalidUrl(err.to_string())))?;
        http_request.headers_mut().insert(HOST, value);
    }

    Ok(http_request)
}
