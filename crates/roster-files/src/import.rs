//! Batch import: `raw/*.source.json` through the normalisers and validator
//! into `data/*.json`.
//!
//! Import is all-or-nothing. Every kind is normalised and the assembled
//! dataset validated in memory. Each output, changelog included, is then
//! staged as a temporary file beside its target, and nothing is renamed into
//! place until every one of them has been written. A bad row, a broken
//! reference, or a failed write leaves `data/` as it was.

use std::path::{Path, PathBuf};

use roster_core::{
  normalize::{
    NormalizeDefaults, check_character_complete, normalize_character,
    normalize_cost, normalize_material, normalize_skill, normalize_stat,
  },
  raw::RawRecord,
  record::EntityKind,
  store::Dataset,
  validate::validate,
};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{info, warn};

use crate::{
  DataDir, Error, Result,
  changelog::{ReleaseEntry, stage_release},
  dataset::load_kind,
  json::{self, Staged},
};

/// Kinds whose raw source must exist for an import to run at all.
const MANDATORY: [EntityKind; 2] = [EntityKind::Characters, EntityKind::Materials];

/// One kind written by an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedKind {
  pub kind: EntityKind,
  pub rows: usize,
  pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub version:  String,
  pub imported: Vec<ImportedKind>,
  /// Optional kinds with no raw source. Their published files, if any, were
  /// validated but left untouched.
  pub skipped:  Vec<EntityKind>,
}

pub struct Importer {
  dir:      DataDir,
  defaults: NormalizeDefaults,
}

impl Importer {
  pub fn new(dir: DataDir, defaults: NormalizeDefaults) -> Self {
    Self { dir, defaults }
  }

  /// Import every kind, validate, publish, and record the release.
  pub fn import_all(&self) -> Result<ImportReport> {
    let mut dataset = Dataset::new();
    let mut fresh = Vec::new();
    let mut skipped = Vec::new();

    for kind in EntityKind::iter() {
      let path = self.dir.raw_path(kind);
      if !path.exists() {
        if MANDATORY.contains(&kind) {
          return Err(Error::MissingSource(path));
        }
        warn!(%kind, path = %path.display(), "raw source not found, skipping");
        load_kind(&self.dir, kind, &mut dataset)?;
        skipped.push(kind);
        continue;
      }
      self.import_kind(kind, &path, &mut dataset)?;
      fresh.push(kind);
    }
    dataset.sort_stats();

    let violations = validate(&dataset);
    if !violations.is_empty() {
      for v in &violations {
        warn!(violation = %v, "validation failed");
      }
      return Err(Error::Validation(violations));
    }

    let mut staged = Vec::with_capacity(fresh.len() + 1);
    for &kind in &fresh {
      staged.push(stage_kind(&dataset, kind, &self.dir.data_path(kind))?);
    }
    staged.push(stage_release(
      &self.dir.changelog_path(),
      &ReleaseEntry::import(&self.defaults.version, self.defaults.today),
    )?);
    for file in staged {
      file.commit()?;
    }

    let imported = fresh
      .into_iter()
      .map(|kind| {
        let rows = dataset.len(kind);
        let path = self.dir.data_path(kind);
        info!(%kind, rows, path = %path.display(), "imported");
        ImportedKind { kind, rows, path }
      })
      .collect();
    info!(version = %self.defaults.version, "import completed");

    Ok(ImportReport {
      version: self.defaults.version.clone(),
      imported,
      skipped,
    })
  }

  fn import_kind(
    &self,
    kind: EntityKind,
    path: &Path,
    dataset: &mut Dataset,
  ) -> Result<()> {
    let records = json::read_records(path)?;
    let d = &self.defaults;
    match kind {
      EntityKind::Characters => {
        dataset.characters.replace_all(normalize_rows(path, &records, |raw| {
          let character = normalize_character(raw, d)?;
          check_character_complete(&character)?;
          Ok(character)
        })?)
      }
      EntityKind::Materials => dataset
        .materials
        .replace_all(normalize_rows(path, &records, |raw| normalize_material(raw, d))?),
      EntityKind::CharacterSkills => dataset
        .skills
        .replace_all(normalize_rows(path, &records, |raw| normalize_skill(raw, d))?),
      EntityKind::UpgradeCosts => dataset
        .costs
        .replace_all(normalize_rows(path, &records, |raw| normalize_cost(raw, d))?),
      EntityKind::CharacterStats => dataset
        .stats
        .replace_all(normalize_rows(path, &records, |raw| normalize_stat(raw, d))?),
    }
    Ok(())
  }
}

/// Normalise every row, stopping at the first failure.
fn normalize_rows<T>(
  path: &Path,
  records: &[RawRecord],
  normalize: impl Fn(&RawRecord) -> roster_core::Result<T>,
) -> Result<Vec<T>> {
  records
    .iter()
    .enumerate()
    .map(|(index, raw)| {
      normalize(raw).map_err(|source| Error::Normalize {
        path: path.to_owned(),
        index,
        source,
      })
    })
    .collect()
}

fn stage_kind(dataset: &Dataset, kind: EntityKind, path: &Path) -> Result<Staged> {
  match kind {
    EntityKind::Characters => json::stage_pretty(path, dataset.characters.rows()),
    EntityKind::Materials => json::stage_pretty(path, dataset.materials.rows()),
    EntityKind::CharacterSkills => json::stage_pretty(path, dataset.skills.rows()),
    EntityKind::UpgradeCosts => json::stage_pretty(path, dataset.costs.rows()),
    EntityKind::CharacterStats => json::stage_pretty(path, dataset.stats.rows()),
  }
}
