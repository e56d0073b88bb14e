//! Declarative binding subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointDescriptor (immutable, built once)
//!     + CallArguments (per invocation)
//!     → template.rs (placeholder substitution — fails before any I/O)
//!     → resolve() (url, headers, encoded body)
//!     → ResolvedRequest
//!     → executor (pool + timeout + retry)
//!     → codec decode into the declared response type
//! ```
//!
//! # Design Decisions
//! - Binding failures are fatal to the call and issue no network request
//! - Caller headers append to generated ones (multi-value semantics) rather
//!   than overriding them
//! - Each call is independent; no state is shared across calls

pub mod descriptor;
pub mod operation;
pub mod template;

use std::collections::HashMap;

use bytes::Bytes;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use hyper::Method;
use serde::Serialize;
use url::Url;

use crate::codec::Codec;
use crate::error::{BindingError, ClientResult};

pub use descriptor::{BodyRole, EndpointDescriptor};
pub use operation::Operation;

/// Per-invocation arguments for a bound operation.
///
/// `B` is the request body type; it defaults to `()` for body-less calls.
#[derive(Debug)]
pub struct CallArguments<'a, B: Serialize = ()> {
    path_params: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<&'a B>,
}

impl CallArguments<'static, ()> {
    pub fn new() -> Self {
        Self {
            path_params: HashMap::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl Default for CallArguments<'static, ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, B: Serialize> CallArguments<'a, B> {
    /// Supply a value for a `{name}` placeholder in the path template.
    pub fn path_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.path_params.insert(name.into(), value.to_string());
        self
    }

    /// Append a query string pair to the resolved URL.
    pub fn query_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Append a header. Repeated names keep every value.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Attach the request body. Only valid for endpoints whose descriptor
    /// declares a request body.
    pub fn body<'b, B2: Serialize>(self, body: &'b B2) -> CallArguments<'b, B2> {
        CallArguments {
            path_params: self.path_params,
            query: self.query,
            headers: self.headers,
            body: Some(body),
        }
    }
}

/// The concrete request produced by binding one descriptor with one set of
/// call arguments. Ephemeral; consumed immediately by the executor.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Resolve a descriptor plus call arguments into a concrete request.
pub fn resolve<B: Serialize, C: Codec>(
    descriptor: &EndpointDescriptor,
    base_url: &Url,
    args: &CallArguments<'_, B>,
    codec: &C,
) -> ClientResult<ResolvedRequest> {
    let path = template::expand(descriptor.path_template(), &args.path_params)?;

    let mut url = base_url.clone();
    let base_path = base_url.path().trim_end_matches('/');
    if path.starts_with('/') {
        url.set_path(&format!("{base_path}{path}"));
    } else {
        url.set_path(&format!("{base_path}/{path}"));
    }
    if !args.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &args.query {
            pairs.append_pair(name, value);
        }
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(codec.content_type()));

    let body = match (descriptor.body_role(), args.body) {
        (BodyRole::RequestBody, Some(value)) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(codec.content_type()));
            codec.encode(value)?
        }
        (BodyRole::RequestBody, None) => return Err(BindingError::MissingBody.into()),
        (BodyRole::None, Some(_)) => return Err(BindingError::UnexpectedBody.into()),
        (BodyRole::None, None) => Bytes::new(),
    };

    // Caller headers never replace generated ones; same-named values append.
    for (name, value) in args.headers.iter() {
        headers.append(name.clone(), value.clone());
    }

    Ok(ResolvedRequest {
        method: descriptor.method().clone(),
        url,
        headers,
        body,
    })
}
