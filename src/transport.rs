//! Transport layer: TCP connect and HTTP/1.1 handshake.
//!
//! # Responsibilities
//! - Dial a route under the connect timeout
//! - Perform the hyper HTTP/1.1 client handshake
//! - Drive the connection task in the background
//! - Classify transport failures into the error taxonomy
//!
//! # Design Decisions
//! - DNS resolution and TLS are external collaborators; the core dials plain
//!   TCP and hands https off to whatever wraps this seam
//! - The connection driver task is detached; it ends when the peer or the
//!   pool closes the connection

use std::io::ErrorKind;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::client::conn::http1::{self, SendRequest};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::time;

use crate::error::{ClientError, ClientResult};
use crate::pool::Route;

/// Establish a new HTTP/1.1 connection to the route.
///
/// Exceeding `connect_timeout` yields `ClientError::ConnectTimeout`; a refused
/// or unreachable peer surfaces as `ClientError::Io`.
pub async fn connect(
    route: &Route,
    connect_timeout: Duration,
) -> ClientResult<SendRequest<Full<Bytes>>> {
    let dial = TcpStream::connect((route.host(), route.port()));
    let stream = match time::timeout(connect_timeout, dial).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => return Err(ClientError::Io(err)),
        Err(_) => return Err(ClientError::ConnectTimeout(connect_timeout)),
    };
    stream.set_nodelay(true)?;

    let (sender, connection) = http1::handshake::<_, Full<Bytes>>(TokioIo::new(stream))
        .await
        .map_err(classify_hyper_error)?;

    let peer = route.to_string();
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            tracing::debug!(peer = %peer, error = %err, "connection task ended with error");
        }
    });

    tracing::debug!(route = %route, "established new connection");
    Ok(sender)
}

/// Map a hyper error onto the failure taxonomy.
///
/// A peer that hangs up mid-exchange shows up either as hyper's
/// incomplete-message error or as an io error in the source chain.
pub fn classify_hyper_error(err: hyper::Error) -> ClientError {
    if err.is_incomplete_message() {
        return ClientError::ConnectionReset(err.to_string());
    }

    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return match io.kind() {
                ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::BrokenPipe
                | ErrorKind::UnexpectedEof => ClientError::ConnectionReset(io.to_string()),
                kind => ClientError::Io(std::io::Error::new(kind, io.to_string())),
            };
        }
        source = cause.source();
    }

    ClientError::Io(std::io::Error::other(err))
}
