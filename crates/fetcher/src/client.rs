//! Request orchestration core

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future;

use crate::backends::ReqwestTransport;
use crate::body::RequestBody;
use crate::error::FetchError;
use crate::headers::Headers;
use crate::options::{CallOptions, RequestOptions};
use crate::params::serialize_params;
use crate::response::{Body, FetchResponse, ResponseKind};
use crate::transport::{
    Method, RequestTarget, Transport, TransportBody, TransportError, TransportRequest,
    TransportResponse,
};

/// Hook deriving the per-call default options from the stored defaults and
/// the raw request target.
pub type OptionExtractor = dyn Fn(&RequestOptions, &str) -> RequestOptions + Send + Sync;

/// Hook transforming a classified failure before it surfaces to the caller.
pub type ErrorNormalizer = dyn Fn(FetchError, &str) -> FetchError + Send + Sync;

/// Ergonomic HTTP client: base-URL resolution, query serialization,
/// timeouts, body encoding and response decoding around a pluggable
/// [`Transport`].
///
/// Configuration is owned by the instance and mutated only through the
/// setter methods; configure before issuing concurrent calls (the setters
/// take `&mut self`, the verbs take `&self`).
pub struct Fetcher {
    base_url: String,
    timeout: Option<Duration>,
    defaults: RequestOptions,
    extract_options: Box<OptionExtractor>,
    normalize_error: Box<ErrorNormalizer>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Create a client with no base URL, no timeout and the default
    /// reqwest transport.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a client builder
    pub fn builder() -> FetcherBuilder {
        FetcherBuilder::default()
    }

    /// Replace the configuration-extractor hook.
    ///
    /// The hook receives the stored defaults and the raw target (query
    /// parameters appended, base URL not yet applied) and returns the
    /// option layer the call options are merged over. The default hook
    /// returns the defaults unchanged.
    pub fn set_option_extractor<F>(&mut self, extractor: F)
    where
        F: Fn(&RequestOptions, &str) -> RequestOptions + Send + Sync + 'static,
    {
        self.extract_options = Box::new(extractor);
    }

    /// Replace the error-normalization hook.
    ///
    /// Every classified failure (timeout, network, status) passes through
    /// the hook together with the raw target before it is returned. The
    /// default hook is the identity.
    pub fn set_error_normalizer<F>(&mut self, normalizer: F)
    where
        F: Fn(FetchError, &str) -> FetchError + Send + Sync + 'static,
    {
        self.normalize_error = Box::new(normalizer);
    }

    /// Replace the stored default options wholesale; there is no merge
    /// with the previous value.
    pub fn set_defaults(&mut self, defaults: RequestOptions) {
        self.defaults = defaults;
    }

    // === Verb methods ===

    /// GET request
    pub async fn get(
        &self,
        target: impl Into<RequestTarget>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Get, options, None).await
    }

    /// DELETE request
    pub async fn delete(
        &self,
        target: impl Into<RequestTarget>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Delete, options, None)
            .await
    }

    /// POST request carrying a body
    pub async fn post(
        &self,
        target: impl Into<RequestTarget>,
        body: impl Into<RequestBody>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Post, options, Some(body.into()))
            .await
    }

    /// PUT request carrying a body
    pub async fn put(
        &self,
        target: impl Into<RequestTarget>,
        body: impl Into<RequestBody>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Put, options, Some(body.into()))
            .await
    }

    /// PATCH request carrying a body
    pub async fn patch(
        &self,
        target: impl Into<RequestTarget>,
        body: impl Into<RequestBody>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Patch, options, Some(body.into()))
            .await
    }

    /// HEAD request; the response payload is always [`Body::None`], any
    /// requested decoding mode is ignored.
    pub async fn head(
        &self,
        target: impl Into<RequestTarget>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Head, options, None).await
    }

    /// OPTIONS request; the response payload is always [`Body::None`], any
    /// requested decoding mode is ignored.
    pub async fn options(
        &self,
        target: impl Into<RequestTarget>,
        options: CallOptions,
    ) -> Result<FetchResponse, FetchError> {
        self.execute(target.into(), Method::Options, options, None)
            .await
    }

    // === Core ===

    /// The single orchestration routine every verb funnels through.
    async fn execute(
        &self,
        target: RequestTarget,
        method: Method,
        options: CallOptions,
        body: Option<RequestBody>,
    ) -> Result<FetchResponse, FetchError> {
        let CallOptions {
            headers,
            credentials,
            cache,
            redirect,
            params,
            timeout,
            cancel,
            response_type,
        } = options;

        // A zero duration from either source disables the timeout branch,
        // with the per-call value taking precedence over the default.
        let timeout = timeout.or(self.timeout).filter(|t| !t.is_zero());
        let kind = response_type.unwrap_or_default();

        let mut target = target;
        if let Some(params) = params {
            let query = serialize_params(&params);
            if !query.is_empty() {
                target = target.append_query(&query);
            }
        }
        // Both hooks see the target as given, before base-URL resolution.
        let raw_target = target.to_string();

        let call_options = RequestOptions {
            headers,
            credentials,
            cache,
            redirect,
        };
        let mut final_options =
            (self.extract_options)(&self.defaults, &raw_target).overlay(call_options);

        let transport_body = match body {
            Some(RequestBody::Multipart(form)) => {
                // The transport picks the multipart boundary; an explicit
                // content type would clobber it.
                if let Some(headers) = final_options.headers.as_mut() {
                    headers.remove("content-type");
                }
                TransportBody::Multipart(form)
            }
            Some(RequestBody::Json(value)) => {
                let encoded = serde_json::to_vec(&value)
                    .map_err(|e| FetchError::Decode(format!("JSON encode failed: {e}")))?;
                final_options
                    .headers_mut()
                    .set("Content-Type", "application/json");
                TransportBody::Bytes(encoded)
            }
            None => TransportBody::None,
        };

        let url = self.resolve_url(&target);
        tracing::debug!(method = %method, url = %url, "dispatching request");

        let request = TransportRequest {
            method,
            url,
            headers: final_options.headers.unwrap_or_default(),
            body: transport_body,
            credentials: final_options.credentials,
            cache: final_options.cache,
            redirect: final_options.redirect,
        };

        // First cancel wins: the exchange races the timeout and the
        // caller's signal; a losing exchange future is dropped, which
        // aborts the in-flight request.
        let exchange = self.transport.perform(request);
        let timed_out = async {
            match timeout {
                Some(after) => tokio::time::sleep(after).await,
                None => future::pending().await,
            }
        };
        let aborted = async {
            match &cancel {
                Some(token) => token.cancelled().await,
                None => future::pending().await,
            }
        };
        let outcome = tokio::select! {
            outcome = exchange => outcome,
            () = timed_out => Err(TransportError::Timeout),
            () = aborted => Err(TransportError::Aborted),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                let failure = FetchError::from(err);
                tracing::debug!(
                    name = failure.name(),
                    status = failure.status(),
                    "transport failure"
                );
                return Err((self.normalize_error)(failure, &raw_target));
            }
        };

        let TransportResponse {
            status,
            status_text,
            ok,
            headers,
            url: final_url,
            redirected,
            body,
        } = response;

        if !ok {
            let data = if is_json(&headers) {
                Some(body.json::<serde_json::Value>().await?)
            } else {
                None
            };
            tracing::debug!(status, "request failed");
            let failure = FetchError::Status {
                status,
                status_text,
                data,
            };
            return Err((self.normalize_error)(failure, &raw_target));
        }

        let data = if matches!(method, Method::Head | Method::Options) {
            Body::None
        } else if kind != ResponseKind::Json || is_json(&headers) {
            match kind {
                ResponseKind::Json => Body::Json(body.json().await?),
                ResponseKind::Text => Body::Text(body.text().await?),
                ResponseKind::Bytes => Body::Bytes(body.bytes().await?),
                ResponseKind::Stream => Body::Stream(body.into_stream()),
            }
        } else {
            // The server declared a non-JSON content type while JSON
            // decoding was requested: no usable payload, not an error.
            Body::None
        };

        Ok(FetchResponse {
            status,
            headers,
            url: final_url,
            redirected,
            data,
        })
    }

    fn resolve_url(&self, target: &RequestTarget) -> String {
        match target {
            RequestTarget::Url(url) => url.to_string(),
            RequestTarget::Raw(raw) => {
                if raw.starts_with("http") {
                    raw.clone()
                } else {
                    format!("{}{}", self.base_url, raw)
                }
            }
        }
    }
}

fn is_json(headers: &Headers) -> bool {
    headers
        .get("content-type")
        .is_some_and(|ct| ct.contains("application/json"))
}

/// Builder for [`Fetcher`] instances.
#[derive(Default)]
pub struct FetcherBuilder {
    base_url: String,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for FetcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetcherBuilder")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FetcherBuilder {
    /// Base URL prepended to relative raw targets; empty by default.
    /// Joined by plain concatenation, so keep the trailing slash semantics
    /// you want.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Default timeout applied when a call does not override it;
    /// `Duration::ZERO` behaves like no timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Transport performing the exchanges; defaults to
    /// [`ReqwestTransport`].
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client
    pub fn build(self) -> Fetcher {
        Fetcher {
            base_url: self.base_url,
            timeout: self.timeout,
            defaults: RequestOptions::default(),
            extract_options: Box::new(|defaults: &RequestOptions, _url: &str| defaults.clone()),
            normalize_error: Box::new(|err, _url| err),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::new())),
        }
    }
}

/// Convenience GET against a one-off default client.
pub async fn fetch(target: impl Into<RequestTarget>) -> Result<FetchResponse, FetchError> {
    Fetcher::new().get(target, CallOptions::default()).await
}
