//! reqwest-based transport implementation

use async_trait::async_trait;
use futures::StreamExt;

use crate::body::{Multipart, PartValue};
use crate::headers::Headers;
use crate::transport::{
    BodyHandle, Method, Transport, TransportBody, TransportError, TransportRequest,
    TransportResponse,
};

/// Default transport, backed by a shared `reqwest::Client`.
///
/// Redirect following, cookies, proxies and TLS are configured on the inner
/// client. The `credentials` and `cache` pass-through knobs have no reqwest
/// equivalent and are ignored; the per-request `redirect` knob is ignored
/// too, since reqwest fixes its redirect policy at client construction.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport over a default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport over a preconfigured client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn perform(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .inner
            .request(map_method(request.method), &request.url);

        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            TransportBody::None => builder,
            TransportBody::Bytes(bytes) => builder.body(bytes),
            TransportBody::Multipart(form) => builder.multipart(into_form(form)?),
        };

        let requested_url = request.url;
        let response = builder.send().await.map_err(TransportError::from)?;

        let status = response.status();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let final_url = response.url().to_string();

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            ok: status.is_success(),
            headers,
            redirected: final_url != requested_url,
            url: final_url,
            body: BodyHandle::from_stream(
                response
                    .bytes_stream()
                    .map(|chunk| {
                        chunk
                            .map(|bytes| bytes.to_vec())
                            .map_err(TransportError::from)
                    })
                    .boxed(),
            ),
        })
    }
}

fn map_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

fn into_form(form: Multipart) -> Result<reqwest::multipart::Form, TransportError> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.into_parts() {
        let (name, value) = part.into_value();
        out = match value {
            PartValue::Text(text) => out.text(name, text),
            PartValue::Bytes {
                data,
                file_name,
                content_type,
            } => {
                let mut part = reqwest::multipart::Part::bytes(data);
                if let Some(file_name) = file_name {
                    part = part.file_name(file_name);
                }
                if let Some(content_type) = content_type {
                    part = part.mime_str(&content_type).map_err(|e| {
                        TransportError::network(format!("invalid part content type: {e}"))
                    })?;
                }
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::named("ConnectError", err.to_string())
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(map_method(Method::Get), reqwest::Method::GET);
        assert_eq!(map_method(Method::Head), reqwest::Method::HEAD);
        assert_eq!(map_method(Method::Options), reqwest::Method::OPTIONS);
    }

    #[test]
    fn multipart_conversion_accepts_text_and_bytes() {
        let form = Multipart::new().text("kind", "avatar").part(
            crate::body::Part::bytes("file", vec![1u8, 2, 3])
                .file_name("a.bin")
                .content_type("application/octet-stream"),
        );
        assert!(into_form(form).is_ok());
    }

    #[test]
    fn multipart_conversion_rejects_malformed_content_type() {
        let form = Multipart::new()
            .part(crate::body::Part::bytes("file", vec![1u8]).content_type("not a mime"));
        assert!(into_form(form).is_err());
    }
}
