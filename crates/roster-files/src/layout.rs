//! Where each file lives inside a data directory.

use std::path::{Path, PathBuf};

use roster_core::record::EntityKind;

const RAW_DIR: &str = "raw";
const DATA_DIR: &str = "data";
const CHANGELOG_FILE: &str = "updates.json";

/// A data directory root. Paths are computed, never checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
  root: PathBuf,
}

impl DataDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  /// `raw/<kind>.source.json`
  pub fn raw_path(&self, kind: EntityKind) -> PathBuf {
    self.root.join(RAW_DIR).join(format!("{kind}.source.json"))
  }

  /// `data/<kind>.json`
  pub fn data_path(&self, kind: EntityKind) -> PathBuf {
    self.root.join(DATA_DIR).join(format!("{kind}.json"))
  }

  pub fn changelog_path(&self) -> PathBuf {
    self.root.join(DATA_DIR).join(CHANGELOG_FILE)
  }
}
