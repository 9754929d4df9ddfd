//! Error type for `roster-files`.

use std::path::PathBuf;

use roster_core::validate::Violation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] roster_core::Error),

  #[error("i/o error at {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    source: std::io::Error,
  },

  #[error("json error in {}: {source}", path.display())]
  Json {
    path:   PathBuf,
    source: serde_json::Error,
  },

  /// A mandatory raw source file does not exist.
  #[error("raw source not found: {}", .0.display())]
  MissingSource(PathBuf),

  /// One row of a batch file failed normalisation; nothing of that run was
  /// written.
  #[error("{}[{index}]: {source}", path.display())]
  Normalize {
    path:   PathBuf,
    index:  usize,
    source: roster_core::Error,
  },

  #[error("validation failed with {} violation(s)", .0.len())]
  Validation(Vec<Violation>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
