//! Shared utilities for integration testing: a small keep-alive-aware mock
//! HTTP backend with programmable per-request behaviour.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Handle to a running mock backend.
pub struct MockBackend {
    pub addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    connections: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests fully received so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Transport connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// One parsed request as seen by the backend.
pub struct ReceivedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ReceivedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// What the backend does with one request.
pub enum Reply {
    /// Write a response after an optional delay.
    Respond {
        status: u16,
        body: String,
        delay: Duration,
    },
    /// Close the connection without responding.
    Hangup,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Respond {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(status: u16, body: impl Into<String>, delay: Duration) -> Self {
        Reply::Respond {
            status,
            body: body.into(),
            delay,
        }
    }
}

/// Install the test log subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start a mock backend on an ephemeral port; the handler decides each reply.
/// Connections are kept alive across requests until the handler hangs up.
pub async fn start_mock_backend<F, Fut>(handler: F) -> MockBackend
where
    F: Fn(ReceivedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let connections = Arc::new(AtomicUsize::new(0));

    let handler = Arc::new(handler);
    let request_counter = requests.clone();
    let connection_counter = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                break;
            };
            connection_counter.fetch_add(1, Ordering::SeqCst);
            let handler = handler.clone();
            let request_counter = request_counter.clone();
            tokio::spawn(async move {
                serve_connection(socket, handler, request_counter).await;
            });
        }
    });

    MockBackend {
        addr,
        requests,
        connections,
    }
}

async fn serve_connection<F, Fut>(
    mut socket: TcpStream,
    handler: Arc<F>,
    request_counter: Arc<AtomicUsize>,
) where
    F: Fn(ReceivedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let mut buffer: Vec<u8> = Vec::new();
    loop {
        // Read until the full request head is buffered.
        let head_end = loop {
            if let Some(pos) = find_subsequence(&buffer, b"\r\n\r\n") {
                break pos + 4;
            }
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            }
        };

        let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or_default();
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let target = parts.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| {
                line.split_once(':')
                    .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
            })
            .collect();
        let content_length: usize = headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);

        // Read the body.
        while buffer.len() < head_end + content_length {
            let mut chunk = [0u8; 4096];
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => buffer.extend_from_slice(&chunk[..n]),
            }
        }
        let body = buffer[head_end..head_end + content_length].to_vec();
        buffer.drain(..head_end + content_length);

        request_counter.fetch_add(1, Ordering::SeqCst);
        let reply = handler(ReceivedRequest {
            method,
            target,
            headers,
            body,
        })
        .await;

        match reply {
            Reply::Respond {
                status,
                body,
                delay,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let reason = match status {
                    200 => "OK",
                    201 => "Created",
                    204 => "No Content",
                    404 => "Not Found",
                    500 => "Internal Server Error",
                    503 => "Service Unavailable",
                    _ => "OK",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                if socket.write_all(response.as_bytes()).await.is_err() {
                    return;
                }
            }
            Reply::Hangup => {
                let _ = socket.shutdown().await;
                return;
            }
        }
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
