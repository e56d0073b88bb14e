//! Error taxonomy for the client core.
//!
//! # Design Decisions
//! - Every failure is a typed result; nothing is swallowed
//! - The error kind tells the caller where the request died: never connected,
//!   waited too long for a pool slot, connected but the server was too slow,
//!   or connected and got a bad response
//! - Retryability is a property of the error kind, not of the call site

use std::time::Duration;

use bytes::Bytes;
use hyper::StatusCode;
use thiserror::Error;

/// Boxed error used as the cause of codec failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while resolving an endpoint description into a concrete
/// request. Always fatal to the call and never retried; no network I/O has
/// happened when one of these is returned.
#[derive(Debug, Error)]
pub enum BindingError {
    /// A `{name}` placeholder in the path template had no matching argument.
    #[error("missing path parameter `{0}`")]
    MissingPathParam(String),

    /// A `{` in the path template was never closed.
    #[error("malformed path template `{0}`: unterminated placeholder")]
    UnterminatedPlaceholder(String),

    /// The endpoint declares a request body but the call supplied none.
    #[error("endpoint declares a request body but none was provided")]
    MissingBody,

    /// The call supplied a body but the endpoint declares none.
    #[error("endpoint declares no request body but one was provided")]
    UnexpectedBody,

    /// The base URL or resolved request URL is unusable.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),

    /// TLS and other schemes are external collaborators, not part of the core.
    #[error("unsupported url scheme `{0}`, only http is supported")]
    UnsupportedScheme(String),
}

/// Terminal outcome of a failed call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be built from the endpoint description.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// The transport connection could not be established in time.
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    /// The pool stayed saturated past the acquire deadline.
    #[error("no pooled connection available within {0:?}")]
    ConnectionAcquireTimeout(Duration),

    /// The server did not deliver a complete response in time. Never retried:
    /// the request may already have been processed server-side.
    #[error("no complete response within {0:?}")]
    ResponseTimeout(Duration),

    /// The peer closed or reset the connection mid-exchange.
    #[error("connection reset: {0}")]
    ConnectionReset(String),

    /// Any other transport-level I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Non-2xx status. Surfaced as-is with the raw body; status-code policy
    /// belongs to the caller, so this core never retries it.
    #[error("server returned {status}")]
    Application { status: StatusCode, body: Bytes },

    /// Request body could not be encoded by the codec.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] BoxError),

    /// Response body did not match the declared response type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] BoxError),

    /// Configuration rejected at startup.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Whether the retry policy may schedule another attempt for this error.
    ///
    /// Only failures that happen before the server could have processed the
    /// request are retryable; a response timeout is not, since a blind retry
    /// risks duplicate side effects for non-idempotent verbs.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectTimeout(_)
                | ClientError::ConnectionAcquireTimeout(_)
                | ClientError::ConnectionReset(_)
                | ClientError::Io(_)
        )
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
