//! Loading a published dataset back from `data/`.

use roster_core::{record::EntityKind, store::Dataset};
use strum::IntoEnumIterator;
use tracing::debug;

use crate::{DataDir, Result, json::read_rows};

/// Bulk-load every published file. Rows go in as they are, without
/// normalisation, so duplicates and blank ids survive for the validator to
/// report. A kind whose file does not exist loads as empty.
pub fn load_dataset(dir: &DataDir) -> Result<Dataset> {
  let mut dataset = Dataset::new();
  for kind in EntityKind::iter() {
    load_kind(dir, kind, &mut dataset)?;
  }
  Ok(dataset)
}

/// Replace one store of `dataset` with the published rows of `kind`. Returns
/// whether the file existed.
pub(crate) fn load_kind(
  dir: &DataDir,
  kind: EntityKind,
  dataset: &mut Dataset,
) -> Result<bool> {
  let path = dir.data_path(kind);
  if !path.exists() {
    debug!(%kind, path = %path.display(), "no published file");
    return Ok(false);
  }
  match kind {
    EntityKind::Characters => dataset.characters.replace_all(read_rows(&path)?),
    EntityKind::Materials => dataset.materials.replace_all(read_rows(&path)?),
    EntityKind::CharacterSkills => dataset.skills.replace_all(read_rows(&path)?),
    EntityKind::UpgradeCosts => dataset.costs.replace_all(read_rows(&path)?),
    EntityKind::CharacterStats => dataset.stats.replace_all(read_rows(&path)?),
  }
  debug!(%kind, rows = dataset.len(kind), "loaded published file");
  Ok(true)
}
