//! Failure taxonomy surfaced to callers

use thiserror::Error;

use crate::transport::TransportError;

/// A classified request failure.
///
/// Every failed call produces exactly one of these; a success never does.
/// [`Timeout`](Self::Timeout), [`Network`](Self::Network) and
/// [`Status`](Self::Status) pass through the error-normalization hook
/// before they surface. [`Decode`](Self::Decode) failures bypass the hook:
/// they happen while consuming a payload the exchange already delivered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The composed cancellation fired on its timeout branch
    #[error("request timed out")]
    Timeout,
    /// Transport-level rejection: DNS, connect failure, caller abort
    #[error("{message}")]
    Network {
        /// Failure kind tag, `NetworkError` unless something more specific is known
        name: String,
        /// Human-readable description
        message: String,
    },
    /// The server answered with a non-success status
    #[error("request failed with status code {status} -- {status_text}")]
    Status {
        /// Server-reported status code
        status: u16,
        /// Server-reported reason phrase
        status_text: String,
        /// Decoded JSON error payload, when the server sent one
        data: Option<serde_json::Value>,
    },
    /// A payload could not be encoded or decoded
    #[error("{0}")]
    Decode(String),
}

impl FetchError {
    /// Status code of the failure: 408 for timeouts, 500 for transport and
    /// decode failures, the server's code otherwise.
    pub fn status(&self) -> u16 {
        match self {
            FetchError::Timeout => 408,
            FetchError::Network { .. } | FetchError::Decode(_) => 500,
            FetchError::Status { status, .. } => *status,
        }
    }

    /// Kind tag of the failure: `TimeoutError`, the network failure's tag,
    /// or the server's reason phrase.
    pub fn name(&self) -> &str {
        match self {
            FetchError::Timeout => "TimeoutError",
            FetchError::Network { name, .. } => name,
            FetchError::Status { status_text, .. } => status_text,
            FetchError::Decode(_) => "DecodeError",
        }
    }

    /// Decoded JSON error payload, when the server sent one
    pub fn data(&self) -> Option<&serde_json::Value> {
        match self {
            FetchError::Status { data, .. } => data.as_ref(),
            _ => None,
        }
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => FetchError::Timeout,
            TransportError::Aborted => FetchError::Network {
                name: "AbortError".to_string(),
                message: "request aborted".to_string(),
            },
            TransportError::Network { name, message } => FetchError::Network { name, message },
            TransportError::Decode(message) => FetchError::Decode(message),
        }
    }
}
