//! The release changelog, `data/updates.json`: newest entry first, one entry
//! per version.

use std::path::Path;

use chrono::NaiveDate;
use roster_core::record::EntityKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::{
  Error, Result,
  json::{self, Staged},
};

pub const IMPORT_SUMMARY: &str = "Imported raw source data.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
  pub id:         String,
  pub version:    String,
  pub date:       NaiveDate,
  pub summary:    String,
  pub items:      Vec<String>,
  pub data_scope: Vec<EntityKind>,
}

impl ReleaseEntry {
  /// The entry written after a successful full import.
  pub fn import(version: &str, date: NaiveDate) -> Self {
    Self {
      id: release_id(version),
      version: version.to_owned(),
      date,
      summary: IMPORT_SUMMARY.to_owned(),
      items: vec![
        "Imported characters/materials/skills/costs/stats from raw sources."
          .to_owned(),
        "Validated cross-file references.".to_owned(),
      ],
      data_scope: EntityKind::iter().collect(),
    }
  }
}

/// `0.3.0` becomes `v0_3_0`.
pub fn release_id(version: &str) -> String {
  format!("v{}", version.replace('.', "_"))
}

/// Prepend `entry`, dropping any earlier entry for the same version. Other
/// entries are kept verbatim, whatever their shape.
pub fn record_release(path: &Path, entry: &ReleaseEntry) -> Result<()> {
  stage_release(path, entry)?.commit()
}

/// [`record_release`] without the final rename.
pub fn stage_release(path: &Path, entry: &ReleaseEntry) -> Result<Staged> {
  let existing = if path.exists() {
    json::read_array(path)?
  } else {
    Vec::new()
  };

  let head = serde_json::to_value(entry).map_err(|source| Error::Json {
    path: path.to_owned(),
    source,
  })?;
  let entries: Vec<Value> = std::iter::once(head)
    .chain(existing.into_iter().filter(|e| {
      e.get("version").and_then(Value::as_str) != Some(entry.version.as_str())
    }))
    .collect();

  json::stage_pretty(path, &entries)
}
