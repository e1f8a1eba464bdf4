//! Request body encodings

use serde::Serialize;

use crate::error::FetchError;

/// A request body accepted by the body-carrying verbs.
///
/// The two encodings are mutually exclusive: JSON payloads are serialized
/// by the core and tagged `application/json`; multipart forms are handed to
/// the transport verbatim so it can pick the boundary.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// JSON-serializable payload, including `null`
    Json(serde_json::Value),
    /// Multipart form data
    Multipart(Multipart),
}

impl RequestBody {
    /// Build a JSON body from any serializable value.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, FetchError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| FetchError::Decode(format!("JSON encode failed: {e}")))
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<Multipart> for RequestBody {
    fn from(form: Multipart) -> Self {
        RequestBody::Multipart(form)
    }
}

/// A multipart form: named parts of text or bytes.
#[derive(Debug, Clone, Default)]
pub struct Multipart {
    parts: Vec<Part>,
}

impl Multipart {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::text(name, value));
        self
    }

    /// Append a prepared part
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Parts in insertion order
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Consume the form into its parts
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    /// Whether the form holds no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    value: PartValue,
}

/// Payload of a form part.
#[derive(Debug, Clone)]
pub enum PartValue {
    /// Plain text field
    Text(String),
    /// Binary field, optionally carrying a file name and content type
    Bytes {
        /// Raw part payload
        data: Vec<u8>,
        /// File name advertised in the part's disposition
        file_name: Option<String>,
        /// Content type advertised for the part
        content_type: Option<String>,
    },
}

impl Part {
    /// A text part
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Text(value.into()),
        }
    }

    /// A binary part
    pub fn bytes(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: PartValue::Bytes {
                data: data.into(),
                file_name: None,
                content_type: None,
            },
        }
    }

    /// Advertise a file name for a binary part; no-op for text parts
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        if let PartValue::Bytes {
            file_name: slot, ..
        } = &mut self.value
        {
            *slot = Some(file_name.into());
        }
        self
    }

    /// Advertise a content type for a binary part; no-op for text parts
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        if let PartValue::Bytes {
            content_type: slot, ..
        } = &mut self.value
        {
            *slot = Some(content_type.into());
        }
        self
    }

    /// Part name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Part payload
    pub fn value(&self) -> &PartValue {
        &self.value
    }

    /// Consume the part into name and payload
    pub fn into_value(self) -> (String, PartValue) {
        (self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    struct CreateItem {
        name: String,
    }

    #[test]
    fn json_body_from_serializable_value() {
        let body = RequestBody::json(&CreateItem {
            name: "n".to_string(),
        })
        .expect("serializable");
        match body {
            RequestBody::Json(value) => assert_eq!(value, json!({"name": "n"})),
            RequestBody::Multipart(_) => panic!("expected JSON body"),
        }
    }

    #[test]
    fn null_is_a_valid_json_body() {
        let body = RequestBody::from(serde_json::Value::Null);
        assert!(matches!(body, RequestBody::Json(serde_json::Value::Null)));
    }

    #[test]
    fn multipart_builder_keeps_part_order() {
        let form = Multipart::new()
            .text("kind", "avatar")
            .part(
                Part::bytes("file", vec![1u8, 2, 3])
                    .file_name("a.bin")
                    .content_type("application/octet-stream"),
            );
        let names: Vec<_> = form.parts().iter().map(Part::name).collect();
        assert_eq!(names, vec!["kind", "file"]);
    }

    #[test]
    fn file_name_is_ignored_on_text_parts() {
        let part = Part::text("kind", "avatar").file_name("a.txt");
        assert!(matches!(part.value(), PartValue::Text(v) if v == "avatar"));
    }
}
