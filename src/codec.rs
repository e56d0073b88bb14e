//! Body codec seam.
//!
//! # Responsibilities
//! - Encode request bodies to bytes and decode response bodies to typed values
//! - Advertise the content type the core puts on `Content-Type`/`Accept`
//!
//! # Design Decisions
//! - The core treats payloads as opaque bytes; everything format-specific
//!   lives behind this trait
//! - An empty response body decodes to the type's `Default` value, never an
//!   error (a DELETE answered with an empty 200 must still produce a response
//!   object with absent fields)

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Encoding/decoding capability injected into the binding layer.
pub trait Codec: Clone + Send + Sync + 'static {
    /// Content type advertised on requests carrying or expecting this format.
    fn content_type(&self) -> &'static str;

    /// Encode a request body value to bytes.
    fn encode<T: Serialize>(&self, value: &T) -> ClientResult<Bytes>;

    /// Decode response body bytes into the declared type. Empty input must
    /// yield `T::default()`.
    fn decode<T: DeserializeOwned + Default>(&self, bytes: &[u8]) -> ClientResult<T>;
}

/// JSON codec backed by serde_json. The conventional default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> ClientResult<Bytes> {
        let encoded = serde_json::to_vec(value).map_err(|err| ClientError::Encode(err.into()))?;
        Ok(Bytes::from(encoded))
    }

    fn decode<T: DeserializeOwned + Default>(&self, bytes: &[u8]) -> ClientResult<T> {
        if bytes.is_empty() {
            return Ok(T::default());
        }
        serde_json::from_slice(bytes).map_err(|err| ClientError::Decode(err.into()))
    }
}
