//! Cross-reference validation over a whole [`Dataset`].
//!
//! The validator is a batch reporter: every check runs regardless of what
//! earlier checks found, and the result is the full list of violations. An
//! empty list means the dataset may be published.
//!
//! Stat rows are not checked for `(character_id, level)` uniqueness; only the
//! four id-keyed kinds are.

use std::{collections::HashSet, fmt};

use serde::Serialize;

use crate::{
  record::{CharacterRef, EntityKind},
  store::Dataset,
};

/// Which rule a [`Violation`] broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
  MissingId,
  DuplicateId,
  UnknownCharacter,
  UnknownMaterial,
}

/// One broken reference or uniqueness rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  pub kind:    EntityKind,
  /// The offending row: its id, or `index=N` for stat rows.
  pub key:     String,
  pub rule:    Rule,
  pub message: String,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.kind, self.message)
  }
}

/// Check id uniqueness and foreign keys across all five stores.
pub fn validate(dataset: &Dataset) -> Vec<Violation> {
  let mut out = Vec::new();

  unique_ids(
    EntityKind::Characters,
    dataset.characters.iter().map(|c| c.id.as_str()),
    &mut out,
  );
  unique_ids(
    EntityKind::Materials,
    dataset.materials.iter().map(|m| m.id.as_str()),
    &mut out,
  );
  unique_ids(
    EntityKind::CharacterSkills,
    dataset.skills.iter().map(|s| s.id.as_str()),
    &mut out,
  );
  unique_ids(
    EntityKind::UpgradeCosts,
    dataset.costs.iter().map(|c| c.id.as_str()),
    &mut out,
  );

  // A blank id never resolves a reference, even when a blank row exists.
  let character_ids: HashSet<&str> = dataset
    .characters
    .iter()
    .map(|c| c.id.as_str())
    .filter(|id| !id.is_empty())
    .collect();
  let material_ids: HashSet<&str> = dataset
    .materials
    .iter()
    .map(|m| m.id.as_str())
    .filter(|id| !id.is_empty())
    .collect();

  for skill in &dataset.skills {
    if !character_ids.contains(skill.character_id.as_str()) {
      out.push(Violation {
        kind:    EntityKind::CharacterSkills,
        key:     skill.id.clone(),
        rule:    Rule::UnknownCharacter,
        message: format!(
          "unknown character_id={} (id={})",
          skill.character_id, skill.id
        ),
      });
    }
  }

  for cost in &dataset.costs {
    match &cost.character_id {
      CharacterRef::All => {}
      CharacterRef::Specific(id) if character_ids.contains(id.as_str()) => {}
      CharacterRef::Specific(id) => out.push(Violation {
        kind:    EntityKind::UpgradeCosts,
        key:     cost.id.clone(),
        rule:    Rule::UnknownCharacter,
        message: format!("unknown character_id={id} (id={})", cost.id),
      }),
    }
    if !material_ids.contains(cost.material_id.as_str()) {
      out.push(Violation {
        kind:    EntityKind::UpgradeCosts,
        key:     cost.id.clone(),
        rule:    Rule::UnknownMaterial,
        message: format!(
          "unknown material_id={} (id={})",
          cost.material_id, cost.id
        ),
      });
    }
  }

  for (index, row) in dataset.stats.iter().enumerate() {
    if !character_ids.contains(row.character_id.as_str()) {
      out.push(Violation {
        kind:    EntityKind::CharacterStats,
        key:     format!("index={index}"),
        rule:    Rule::UnknownCharacter,
        message: format!(
          "unknown character_id={} (index={index})",
          row.character_id
        ),
      });
    }
  }

  out
}

fn unique_ids<'a>(
  kind: EntityKind,
  ids: impl Iterator<Item = &'a str>,
  out: &mut Vec<Violation>,
) {
  let mut seen = HashSet::new();
  for (index, id) in ids.enumerate() {
    if id.is_empty() {
      out.push(Violation {
        kind,
        key: format!("index={index}"),
        rule: Rule::MissingId,
        message: "missing id".to_owned(),
      });
      continue;
    }
    if !seen.insert(id) {
      out.push(Violation {
        kind,
        key: id.to_owned(),
        rule: Rule::DuplicateId,
        message: format!("duplicated id={id}"),
      });
    }
  }
}
