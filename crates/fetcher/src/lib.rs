//! Ergonomic async HTTP wrapper
//!
//! This crate wraps a pluggable transport primitive with the plumbing every
//! caller ends up writing anyway: base-URL resolution, query-parameter
//! serialization, timeout-based cancellation, JSON/multipart body encoding
//! and response decoding. Two hooks allow injecting per-call default
//! options and transforming failures before they surface.
//!
//! The transport stays opaque: redirect following, cookies, proxies and TLS
//! belong to the [`Transport`] implementation (by default a
//! [`ReqwestTransport`]), never to this crate.
//!
//! # Example
//!
//! ```no_run
//! use fetcher::{CallOptions, Fetcher, Params};
//! use serde_json::json;
//!
//! async fn example() -> Result<(), fetcher::FetchError> {
//!     let client = Fetcher::builder()
//!         .base_url("https://api.example.com")
//!         .timeout(std::time::Duration::from_secs(10))
//!         .build();
//!
//!     let found = client
//!         .get(
//!             "/items",
//!             CallOptions {
//!                 params: Some(Params::new().param("tag", "new")),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!     println!("status {}", found.status);
//!
//!     let created = client
//!         .post("/items", json!({"name": "n"}), CallOptions::default())
//!         .await?;
//!     println!("created {:?}", created.data.as_json());
//!     Ok(())
//! }
//! ```

mod backends;
mod body;
mod client;
mod error;
mod headers;
mod options;
mod params;
mod response;
mod transport;

pub use backends::ReqwestTransport;
pub use body::{Multipart, Part, PartValue, RequestBody};
pub use client::{fetch, ErrorNormalizer, Fetcher, FetcherBuilder, OptionExtractor};
pub use error::FetchError;
pub use headers::Headers;
pub use options::{CacheMode, CallOptions, CredentialsMode, RedirectPolicy, RequestOptions};
pub use params::{serialize_params, ParamValue, Params, Scalar};
pub use response::{Body, FetchResponse, ResponseKind};
pub use transport::{
    BodyHandle, ByteStream, Method, RequestTarget, Transport, TransportBody, TransportError,
    TransportRequest, TransportResponse,
};
