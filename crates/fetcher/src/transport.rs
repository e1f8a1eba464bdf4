//! Transport boundary: the opaque primitive that performs network exchanges
//!
//! The orchestration core builds a [`TransportRequest`], hands it to a
//! [`Transport`] implementation and interprets the returned
//! [`TransportResponse`]. Redirect following, cookies, proxies and TLS are
//! entirely the transport's business; the core never looks at them.

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::body::Multipart;
use crate::headers::Headers;
use crate::options::{CacheMode, CredentialsMode, RedirectPolicy};

/// Streamed response body: chunks of bytes, or a transport failure mid-read.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl Method {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request target: either an already parsed URL, used verbatim, or a raw
/// string that may still be resolved against a base URL.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    /// Parsed URL, never prefixed with the base URL
    Url(Url),
    /// Raw string; prefixed with the base URL unless it starts with `http`
    Raw(String),
}

impl RequestTarget {
    /// Append a serialized query string, honoring any existing query.
    ///
    /// Callers pass non-empty strings only; an all-dropped parameter set
    /// appends nothing at the call site.
    pub(crate) fn append_query(self, query: &str) -> Self {
        match self {
            RequestTarget::Url(mut url) => {
                let combined = match url.query() {
                    Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                    _ => query.to_string(),
                };
                url.set_query(Some(&combined));
                RequestTarget::Url(url)
            }
            RequestTarget::Raw(raw) => {
                let sep = if raw.contains('?') { '&' } else { '?' };
                RequestTarget::Raw(format!("{raw}{sep}{query}"))
            }
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestTarget::Url(url) => f.write_str(url.as_str()),
            RequestTarget::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<Url> for RequestTarget {
    fn from(url: Url) -> Self {
        RequestTarget::Url(url)
    }
}

impl From<&str> for RequestTarget {
    fn from(raw: &str) -> Self {
        RequestTarget::Raw(raw.to_string())
    }
}

impl From<String> for RequestTarget {
    fn from(raw: String) -> Self {
        RequestTarget::Raw(raw)
    }
}

/// Request body as handed to the transport.
#[derive(Debug, Clone, Default)]
pub enum TransportBody {
    /// No body attached
    #[default]
    None,
    /// Pre-encoded bytes, content type already set in the headers
    Bytes(Vec<u8>),
    /// Multipart form; the transport encodes it and picks the boundary
    Multipart(Multipart),
}

/// One network exchange, fully described.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Fully resolved target URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: TransportBody,
    /// Credential mode; transports without an equivalent ignore it
    pub credentials: Option<CredentialsMode>,
    /// Cache mode; transports without an equivalent ignore it
    pub cache: Option<CacheMode>,
    /// Redirect policy; transports without an equivalent ignore it
    pub redirect: Option<RedirectPolicy>,
}

/// What the transport reports back for a completed exchange.
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status code
    pub status_text: String,
    /// Whether the transport considers the exchange successful
    pub ok: bool,
    /// Response headers
    pub headers: Headers,
    /// Final URL after any redirect following
    pub url: String,
    /// Whether a redirect was followed
    pub redirected: bool,
    /// Body handle, consumable exactly once
    pub body: BodyHandle,
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("status_text", &self.status_text)
            .field("ok", &self.ok)
            .field("url", &self.url)
            .field("redirected", &self.redirected)
            .finish_non_exhaustive()
    }
}

/// Handle over an unread response body.
///
/// Exactly one consumption is possible: [`bytes`](Self::bytes),
/// [`text`](Self::text), [`json`](Self::json) or
/// [`into_stream`](Self::into_stream).
pub struct BodyHandle {
    stream: ByteStream,
}

impl fmt::Debug for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyHandle").finish_non_exhaustive()
    }
}

impl BodyHandle {
    /// A handle over an empty body
    pub fn empty() -> Self {
        Self {
            stream: futures::stream::empty().boxed(),
        }
    }

    /// A handle over an in-memory body
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        Self {
            stream: futures::stream::once(async move { Ok(bytes) }).boxed(),
        }
    }

    /// A handle over a live byte stream
    pub fn from_stream(stream: ByteStream) -> Self {
        Self { stream }
    }

    /// Consume the body fully into one byte buffer
    pub async fn bytes(self) -> Result<Vec<u8>, TransportError> {
        self.stream
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
    }

    /// Consume the body fully and decode it as UTF-8 text
    pub async fn text(self) -> Result<String, TransportError> {
        String::from_utf8(self.bytes().await?)
            .map_err(|e| TransportError::Decode(format!("response body is not UTF-8: {e}")))
    }

    /// Consume the body fully and decode it as JSON
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, TransportError> {
        serde_json::from_slice(&self.bytes().await?)
            .map_err(|e| TransportError::Decode(format!("JSON decode failed: {e}")))
    }

    /// Hand over the raw byte stream without consuming it
    pub fn into_stream(self) -> ByteStream {
        self.stream
    }
}

/// Failures the transport can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The exchange exceeded its deadline
    #[error("request timed out")]
    Timeout,
    /// The exchange was cancelled through a cancellation signal
    #[error("request aborted")]
    Aborted,
    /// Any other transport-level failure: DNS, connect, TLS, mid-body IO
    #[error("{message}")]
    Network {
        /// Failure kind tag, `NetworkError` when nothing more specific is known
        name: String,
        /// Human-readable description
        message: String,
    },
    /// The body could not be decoded as requested
    #[error("{0}")]
    Decode(String),
}

impl TransportError {
    /// A network failure with the default `NetworkError` tag
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network {
            name: "NetworkError".to_string(),
            message: message.into(),
        }
    }

    /// A network failure with a specific kind tag
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        TransportError::Network {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// The platform request primitive, seen from the orchestration core.
///
/// Implementations perform exactly one exchange per call. Cancellation is
/// cooperative: the core drops the returned future when a timeout or a
/// caller signal fires first, and the implementation is expected to abort
/// the in-flight exchange on drop.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one network exchange.
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}
