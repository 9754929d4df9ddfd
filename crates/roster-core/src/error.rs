//! Error types for `roster-core`.

use thiserror::Error;

use crate::record::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The input was empty, or nothing usable survived normalisation.
  #[error("invalid identifier: {input:?}")]
  InvalidIdentifier { input: String },

  /// Every missing field of the record is listed, not just the first one.
  #[error("{kind} {key:?}: missing required fields: {}", fields.join(", "))]
  MissingRequiredField {
    kind:   EntityKind,
    key:    String,
    fields: Vec<String>,
  },

  #[error("invalid shape for {context}: expected {expected}")]
  InvalidShape {
    context:  String,
    expected: &'static str,
  },

  #[error("invalid value for {field}: {value:?}")]
  InvalidValue { field: String, value: String },

  #[error("duplicate {kind} key: {key}")]
  DuplicateKey { kind: EntityKind, key: String },

  #[error("identifier pattern error: {0}")]
  Pattern(regex::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
