//! Untyped records at the ingestion boundary.
//!
//! Raw input is authored by hand and only loosely follows the canonical
//! schema: numbers arrive as strings, optional fields are missing or empty,
//! and structured payloads are sometimes flattened. [`RawRecord`] wraps the
//! JSON object and offers lenient accessors; nothing outside the normaliser
//! should ever hold one.

use serde_json::{Map, Value};

use crate::{Error, Result};

/// A single loosely-typed record, exactly as it appeared in the source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Map<String, Value>);

impl RawRecord {
  pub fn new() -> Self { Self::default() }

  /// Wrap a JSON value, which must be an object.
  pub fn from_value(value: Value, context: &str) -> Result<Self> {
    match value {
      Value::Object(map) => Ok(Self(map)),
      _ => Err(Error::InvalidShape {
        context:  context.to_owned(),
        expected: "an object",
      }),
    }
  }

  /// Split a top-level JSON array into records. Every element must be an
  /// object.
  pub fn from_array(value: Value, context: &str) -> Result<Vec<Self>> {
    let Value::Array(items) = value else {
      return Err(Error::InvalidShape {
        context:  context.to_owned(),
        expected: "an array",
      });
    };
    items
      .into_iter()
      .enumerate()
      .map(|(i, item)| Self::from_value(item, &format!("{context}[{i}]")))
      .collect()
  }

  /// Builder-style setter, used where raw input is assembled from flags or
  /// form fields rather than parsed.
  pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.0.insert(key.to_owned(), value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&Value> { self.0.get(key) }

  pub fn into_value(self) -> Value { Value::Object(self.0) }

  /// Trimmed text for `key`. Missing, null, and blank values yield `None`;
  /// numbers and booleans are rendered as text.
  pub fn text(&self, key: &str) -> Option<String> {
    let text = match self.0.get(key)? {
      Value::String(s) => s.trim().to_owned(),
      Value::Number(n) => n.to_string(),
      Value::Bool(b) => b.to_string(),
      Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
  }

  /// Like [`text`](Self::text), falling back to `default`.
  pub fn text_or(&self, key: &str, default: &str) -> String {
    self.text(key).unwrap_or_else(|| default.to_owned())
  }

  /// A finite number, accepting numeric strings.
  pub fn number(&self, key: &str) -> Option<f64> {
    let value = self.0.get(key)?;
    let parsed = match value {
      Value::Number(n) => n.as_f64(),
      Value::String(s) if s.trim().is_empty() => return None,
      Value::String(s) => s.trim().parse::<f64>().ok(),
      Value::Null => return None,
      _ => None,
    };
    match parsed.filter(|n| n.is_finite()) {
      Some(n) => Some(n),
      None => {
        tracing::debug!(field = key, ?value, "value is not numeric; using default");
        None
      }
    }
  }

  /// A non-negative integer; fractional input is truncated.
  pub fn uint(&self, key: &str) -> Option<u64> {
    let n = self.number(key)?;
    if n < 0.0 || n > u64::MAX as f64 {
      tracing::debug!(field = key, value = n, "value out of range; using default");
      return None;
    }
    Some(n.trunc() as u64)
  }

  /// An ordered list of strings. Anything other than an array yields an empty
  /// list; non-string elements are rendered as text and blanks dropped.
  pub fn strings(&self, key: &str) -> Vec<String> {
    let Some(Value::Array(items)) = self.0.get(key) else {
      return Vec::new();
    };
    items
      .iter()
      .filter_map(|item| match item {
        Value::String(s) => Some(s.trim().to_owned()),
        Value::Null => None,
        other => Some(other.to_string()),
      })
      .filter(|s| !s.is_empty())
      .collect()
  }

  /// A nested object, if `key` holds one.
  pub fn object(&self, key: &str) -> Option<RawRecord> {
    match self.0.get(key)? {
      Value::Object(map) => Some(Self(map.clone())),
      _ => None,
    }
  }

  /// Every entry except the listed keys, for carrying unknown payload fields.
  pub fn rest(&self, known: &[&str]) -> Map<String, Value> {
    self
      .0
      .iter()
      .filter(|(k, _)| !known.contains(&k.as_str()))
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect()
  }
}

impl From<Map<String, Value>> for RawRecord {
  fn from(map: Map<String, Value>) -> Self { Self(map) }
}
