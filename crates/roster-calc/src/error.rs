//! Error types for `roster-calc`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("owned quantities must be a JSON object, got {0}")]
  InvalidShape(&'static str),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
