//! Declarative, resilient HTTP client core.
//!
//! Describe remote endpoints as data (verb, path template, body role,
//! response type), bind them into callable operations, and let one shared
//! engine handle the connection pool, timeouts, retry with fixed backoff and
//! body marshalling.
//!
//! ```no_run
//! use restbind::{CallArguments, Client, EndpointDescriptor};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Default, Deserialize)]
//! struct Post {
//!     id: Option<i64>,
//!     title: Option<String>,
//!     body: Option<String>,
//! }
//!
//! # async fn run() -> restbind::ClientResult<()> {
//! let client = Client::builder("http://jsonplaceholder.typicode.com").build()?;
//! let get_post = client.bind::<Post>(EndpointDescriptor::get("/posts/{id}"));
//!
//! let post = get_post.call(CallArguments::new().path_param("id", 1)).await?;
//! assert_eq!(post.id, Some(1));
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod pool;
pub mod resilience;
pub mod transport;

pub use binding::{BodyRole, CallArguments, EndpointDescriptor, Operation};
pub use client::{Client, ClientBuilder};
pub use codec::{Codec, JsonCodec};
pub use config::ClientConfig;
pub use error::{BindingError, ClientError, ClientResult};
pub use executor::{RawResponse, RequestExecutor};
pub use pool::{ConnectionPool, PoolStats, Route};
pub use resilience::{RetryPolicy, TimeoutPolicy};
