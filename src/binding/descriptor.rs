//! Endpoint descriptors.
//!
//! A descriptor is the declarative half of an operation: verb, path template
//! and body role. Created once at binding-setup time, never mutated, shared
//! read-only by every call to that operation. The response type is the
//! `Operation`'s generic parameter, fixed at binding time.

use hyper::Method;

/// Whether an endpoint carries a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    /// No request body; supplying one is a binding error.
    None,
    /// A request body is required and encoded via the codec.
    RequestBody,
}

/// Immutable description of one remote endpoint.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    method: Method,
    path_template: String,
    body_role: BodyRole,
}

impl EndpointDescriptor {
    pub fn new(method: Method, path_template: impl Into<String>, body_role: BodyRole) -> Self {
        Self {
            method,
            path_template: path_template.into(),
            body_role,
        }
    }

    /// GET endpoint, no request body.
    pub fn get(path_template: impl Into<String>) -> Self {
        Self::new(Method::GET, path_template, BodyRole::None)
    }

    /// POST endpoint carrying a request body.
    pub fn post(path_template: impl Into<String>) -> Self {
        Self::new(Method::POST, path_template, BodyRole::RequestBody)
    }

    /// PUT endpoint carrying a request body.
    pub fn put(path_template: impl Into<String>) -> Self {
        Self::new(Method::PUT, path_template, BodyRole::RequestBody)
    }

    /// DELETE endpoint, no request body.
    pub fn delete(path_template: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path_template, BodyRole::None)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn body_role(&self) -> BodyRole {
        self.body_role
    }
}
