//! Query parameter serialization

use url::form_urlencoded;

/// A single query parameter value.
///
/// `Null` values are dropped during serialization, as are empty strings.
/// Numbers and booleans are stringified.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text value, dropped when empty
    Str(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Absent value, always dropped
    Null,
}

impl Scalar {
    /// Text form appended to the query string, or `None` when the value is
    /// dropped.
    fn render(&self) -> Option<String> {
        match self {
            Scalar::Str(s) if s.is_empty() => None,
            Scalar::Str(s) => Some(s.clone()),
            Scalar::Int(n) => Some(n.to_string()),
            Scalar::Float(n) => Some(n.to_string()),
            Scalar::Bool(b) => Some(b.to_string()),
            Scalar::Null => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map_or(Scalar::Null, Into::into)
    }
}

/// A query parameter: a single scalar or a list of scalars.
///
/// List values emit one `key=value` pair per retained element, preserving
/// list order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// One scalar value
    Single(Scalar),
    /// A flattened list of scalar values
    List(Vec<Scalar>),
}

impl<S: Into<Scalar>> From<Vec<S>> for ParamValue {
    fn from(values: Vec<S>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<Scalar> for ParamValue {
    fn from(value: Scalar) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Single(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Single(value.into())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        ParamValue::Single(value.into())
    }
}

/// An insertion-ordered mapping of query parameter names to values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter, keeping insertion order
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries (before any value dropping)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Serialize a parameter mapping into a URL-encoded query string.
///
/// The output carries no leading `?`. `Null` and empty-string values are
/// dropped; list values are flattened with the same per-element rule.
/// Returns an empty string when the mapping is empty or every value was
/// dropped.
pub fn serialize_params(params: &Params) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params.iter() {
        match value {
            ParamValue::Single(scalar) => {
                if let Some(text) = scalar.render() {
                    serializer.append_pair(key, &text);
                }
            }
            ParamValue::List(scalars) => {
                for scalar in scalars {
                    if let Some(text) = scalar.render() {
                        serializer.append_pair(key, &text);
                    }
                }
            }
        }
    }
    serializer.finish()
}
