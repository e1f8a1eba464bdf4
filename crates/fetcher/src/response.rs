//! Response envelope and payload decoding

use std::fmt;

use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::headers::Headers;
use crate::transport::ByteStream;

/// How a response body should be decoded.
///
/// The platform's `arrayBuffer` and `blob` modes both collapse into
/// [`Bytes`](Self::Bytes); Rust draws no distinction between the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseKind {
    /// Decode as JSON; yields no payload when the server declares a
    /// different content type
    #[default]
    Json,
    /// Decode as UTF-8 text
    Text,
    /// Collect the raw bytes
    Bytes,
    /// Hand over the byte stream without consuming it
    Stream,
}

/// Decoded response payload.
pub enum Body {
    /// No usable payload
    None,
    /// Decoded JSON document
    Json(serde_json::Value),
    /// Decoded text
    Text(String),
    /// Raw collected bytes
    Bytes(Vec<u8>),
    /// Unconsumed byte stream
    Stream(ByteStream),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::None => f.write_str("Body::None"),
            Body::Json(value) => f.debug_tuple("Body::Json").field(value).finish(),
            Body::Text(text) => f.debug_tuple("Body::Text").field(text).finish(),
            Body::Bytes(bytes) => f
                .debug_struct("Body::Bytes")
                .field("len", &bytes.len())
                .finish(),
            Body::Stream(_) => f.write_str("Body::Stream"),
        }
    }
}

impl Body {
    /// Whether the call produced no usable payload
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// Decoded JSON document, when present
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Decoded text, when present
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Collected bytes, when present
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Take the byte stream out of a streamed payload
    pub fn into_stream(self) -> Option<ByteStream> {
        match self {
            Body::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Deserialize a JSON payload into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        match self {
            Body::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| FetchError::Decode(format!("JSON decode failed: {e}"))),
            _ => Err(FetchError::Decode("payload is not JSON".to_string())),
        }
    }
}

/// Result of a successful call.
///
/// Only transport-level successes are ever wrapped in this envelope; the
/// platform's `ok` flag is carried by the `Ok` variant of the surrounding
/// `Result`, so it is true by construction here.
#[derive(Debug)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers as reported by the transport
    pub headers: Headers,
    /// Final URL after any redirect following
    pub url: String,
    /// Whether the transport followed a redirect
    pub redirected: bool,
    /// Decoded payload
    pub data: Body,
}

impl FetchResponse {
    /// Deserialize the JSON payload into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        self.data.json()
    }
}
