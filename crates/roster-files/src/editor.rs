//! Single-record edits of `raw/characters.source.json`.
//!
//! Unlike batch import, a rejected record only fails its own edit. Other rows
//! of the source are kept as authored.

use roster_core::{
  ident::normalize_id,
  normalize::{NormalizeDefaults, check_character_complete, normalize_character},
  raw::RawRecord,
  record::{Character, EntityKind},
  store::{UpsertOutcome, display_order},
};
use serde_json::Value;
use tracing::info;

use crate::{DataDir, Error, Result, json};

/// Normalise `raw` and write it into the character source, replacing the row
/// with the same id or adding a new one. The source stays sorted by name.
pub fn upsert_character(
  dir: &DataDir,
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<(Character, UpsertOutcome)> {
  let character = normalize_character(raw, defaults)?;
  check_character_complete(&character)?;

  let path = dir.raw_path(EntityKind::Characters);
  let mut rows = if path.exists() {
    json::read_array(&path)?
  } else {
    Vec::new()
  };

  let row = serde_json::to_value(&character).map_err(|source| Error::Json {
    path: path.clone(),
    source,
  })?;
  let existing = rows
    .iter()
    .position(|r| row_id(r).as_deref() == Some(character.id.as_str()));
  let outcome = match existing {
    Some(i) => {
      rows[i] = row;
      UpsertOutcome::Updated
    }
    None => {
      rows.push(row);
      UpsertOutcome::Created
    }
  };
  rows.sort_by(|a, b| display_order(row_name(a), row_name(b)));

  json::write_pretty(&path, &rows)?;
  info!(id = %character.id, %outcome, rows = rows.len(), "character source updated");
  Ok((character, outcome))
}

/// The id a hand-authored row would normalise to.
fn row_id(row: &Value) -> Option<String> {
  let id = row
    .get("id")
    .and_then(Value::as_str)
    .filter(|s| !s.trim().is_empty())
    .or_else(|| row.get("name").and_then(Value::as_str))?;
  normalize_id(id).ok()
}

fn row_name(row: &Value) -> &str {
  row.get("name").and_then(Value::as_str).unwrap_or("")
}
