//! Request option bags and layered merging

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::headers::Headers;
use crate::params::Params;
use crate::response::ResponseKind;

/// Credential handling requested from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsMode {
    /// Never send credentials
    Omit,
    /// Send credentials to same-origin targets only
    SameOrigin,
    /// Always send credentials
    Include,
}

/// Cache interaction requested from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Follow standard cache rules
    Default,
    /// Bypass the cache entirely
    NoStore,
    /// Always revalidate against the network
    Reload,
    /// Revalidate before using a cached entry
    NoCache,
    /// Use any cached entry regardless of freshness
    ForceCache,
    /// Fail unless a cached entry exists
    OnlyIfCached,
}

/// Redirect handling requested from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow redirects transparently
    Follow,
    /// Treat a redirect as a failure
    Error,
    /// Surface the redirect response as-is
    Manual,
}

/// Transport-facing request options: the mergeable subset of configuration.
///
/// Holds everything a call may layer over the stored defaults. Method, body
/// and cancellation are deliberately not representable here, so they can
/// never be smuggled in through the defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Request headers; a later layer replaces the collection wholesale
    pub headers: Option<Headers>,
    /// Credential mode passed through to the transport
    pub credentials: Option<CredentialsMode>,
    /// Cache mode passed through to the transport
    pub cache: Option<CacheMode>,
    /// Redirect policy passed through to the transport
    pub redirect: Option<RedirectPolicy>,
}

impl RequestOptions {
    /// Layer `over` on top of `self`: for each field the later layer wins
    /// when set. There is no recursive merge; a `headers` collection from
    /// the later layer fully replaces the earlier one.
    pub fn overlay(self, over: RequestOptions) -> RequestOptions {
        RequestOptions {
            headers: over.headers.or(self.headers),
            credentials: over.credentials.or(self.credentials),
            cache: over.cache.or(self.cache),
            redirect: over.redirect.or(self.redirect),
        }
    }

    /// Mutable access to the header collection, creating it when absent.
    ///
    /// An existing collection is returned aliased, not copied, so callers
    /// mutate the options in place.
    pub fn headers_mut(&mut self) -> &mut Headers {
        self.headers.get_or_insert_with(Headers::new)
    }
}

/// Per-call options accepted by every verb method.
///
/// Extends [`RequestOptions`] with the call-scoped controls. The control
/// fields (`params`, `timeout`, `cancel`, `response_type`) are consumed by
/// the orchestration core and never reach the transport options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Request headers for this call
    pub headers: Option<Headers>,
    /// Credential mode for this call
    pub credentials: Option<CredentialsMode>,
    /// Cache mode for this call
    pub cache: Option<CacheMode>,
    /// Redirect policy for this call
    pub redirect: Option<RedirectPolicy>,
    /// Query parameters appended to the target URL
    pub params: Option<Params>,
    /// Timeout override; `Duration::ZERO` disables the instance default
    pub timeout: Option<Duration>,
    /// Caller-supplied cancellation signal
    pub cancel: Option<CancellationToken>,
    /// Response decoding mode, defaults to JSON
    pub response_type: Option<ResponseKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_prefers_later_layer_per_field() {
        let base = RequestOptions {
            headers: Some(Headers::from([("a", "1"), ("b", "2")])),
            credentials: Some(CredentialsMode::Include),
            cache: Some(CacheMode::NoStore),
            redirect: None,
        };
        let over = RequestOptions {
            headers: Some(Headers::from([("c", "3")])),
            credentials: None,
            cache: Some(CacheMode::Reload),
            redirect: Some(RedirectPolicy::Manual),
        };

        let merged = base.overlay(over);
        // headers replace wholesale, no per-entry merge
        assert_eq!(merged.headers, Some(Headers::from([("c", "3")])));
        assert_eq!(merged.credentials, Some(CredentialsMode::Include));
        assert_eq!(merged.cache, Some(CacheMode::Reload));
        assert_eq!(merged.redirect, Some(RedirectPolicy::Manual));
    }

    #[test]
    fn overlay_keeps_base_when_later_layer_is_unset() {
        let base = RequestOptions {
            headers: Some(Headers::from([("a", "1")])),
            ..Default::default()
        };
        let merged = base.clone().overlay(RequestOptions::default());
        assert_eq!(merged, base);
    }

    #[test]
    fn headers_mut_aliases_existing_collection() {
        let mut options = RequestOptions {
            headers: Some(Headers::from([("a", "1")])),
            ..Default::default()
        };
        options.headers_mut().set("a", "2");
        assert_eq!(
            options.headers.as_ref().and_then(|h| h.get("a")),
            Some("2")
        );
    }

    #[test]
    fn headers_mut_creates_collection_when_absent() {
        let mut options = RequestOptions::default();
        options.headers_mut().set("a", "1");
        assert_eq!(
            options.headers.as_ref().and_then(|h| h.get("a")),
            Some("1")
        );
    }
}
