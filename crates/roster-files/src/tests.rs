//! Integration tests for import, loading, and editing against a temporary
//! data directory.

use std::{fs, path::Path};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use roster_core::{
  normalize::NormalizeDefaults,
  raw::RawRecord,
  record::{CharacterRef, EntityKind},
  store::UpsertOutcome,
  validate::{Rule, validate},
};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{DataDir, Error, Importer, json as files, load_dataset, upsert_character};

fn defaults() -> NormalizeDefaults {
  NormalizeDefaults::new(NaiveDate::from_ymd_opt(2026, 1, 22).unwrap(), "0.3.0")
}

fn write(path: &Path, value: Value) { files::write_pretty(path, &value).unwrap(); }

/// A data directory with mandatory sources and a consistent set of optional
/// ones.
fn seeded() -> (TempDir, DataDir) {
  let tmp = tempfile::tempdir().unwrap();
  let dir = DataDir::new(tmp.path());
  write(
    &dir.raw_path(EntityKind::Characters),
    json!([
      { "id": "perlica", "name": "Perlica", "rarity": 5, "element": "Electric",
        "role": "Caster", "weapon_type": "Arts Unit" },
      { "name": "Ardelia", "rarity": "6", "element": "Nature",
        "role": "Supporter", "weapon_type": "Arts Unit" },
    ]),
  );
  write(
    &dir.raw_path(EntityKind::Materials),
    json!([
      { "id": "t_creds", "name": "T-Creds" },
      { "name": "Protoprism", "category": "Ascension" },
    ]),
  );
  write(
    &dir.raw_path(EntityKind::CharacterSkills),
    json!([{ "id": "perlica_s1", "character_id": "Perlica", "atk_scale": 2.4 }]),
  );
  write(
    &dir.raw_path(EntityKind::UpgradeCosts),
    json!([
      { "id": "lv_1", "character_id": "perlica", "from_level": 1, "to_level": 20,
        "material_id": "protoprism", "amount": 8, "credit_cost": 1200 },
      { "id": "asc_1", "character_id": "*", "upgrade_type": "ascension",
        "from_level": 20, "to_level": 40, "material_id": "protoprism",
        "amount": 4, "credit_cost": 3000 },
    ]),
  );
  write(
    &dir.raw_path(EntityKind::CharacterStats),
    json!([
      { "character_id": "perlica", "level": 20, "hp": 1400, "atk": 90 },
      { "character_id": "perlica", "level": 1, "hp": 500, "atk": 30 },
      { "character_id": "ardelia", "level": 1, "hp": 520, "atk": 28 },
    ]),
  );
  (tmp, dir)
}

fn ids(path: &Path) -> Vec<String> {
  files::read_array(path)
    .unwrap()
    .iter()
    .map(|row| row["id"].as_str().unwrap_or_default().to_owned())
    .collect()
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[test]
fn import_publishes_every_kind() {
  let (_tmp, dir) = seeded();
  let report = Importer::new(dir.clone(), defaults()).import_all().unwrap();

  let kinds: Vec<_> = report.imported.iter().map(|k| (k.kind, k.rows)).collect();
  assert_eq!(kinds, vec![
    (EntityKind::Characters, 2),
    (EntityKind::Materials, 2),
    (EntityKind::CharacterSkills, 1),
    (EntityKind::UpgradeCosts, 2),
    (EntityKind::CharacterStats, 3),
  ]);
  assert!(report.skipped.is_empty());

  assert_eq!(ids(&dir.data_path(EntityKind::Characters)), ["ardelia", "perlica"]);
  assert_eq!(ids(&dir.data_path(EntityKind::Materials)), ["protoprism", "t_creds"]);

  let stats = files::read_array(&dir.data_path(EntityKind::CharacterStats)).unwrap();
  let keys: Vec<_> = stats
    .iter()
    .map(|s| (s["character_id"].as_str().unwrap(), s["level"].as_u64().unwrap()))
    .collect();
  assert_eq!(keys, [("ardelia", 1), ("perlica", 1), ("perlica", 20)]);

  let skills = files::read_array(&dir.data_path(EntityKind::CharacterSkills)).unwrap();
  assert_eq!(skills[0]["character_id"], "perlica");
  assert_eq!(skills[0]["multiplier_data"]["atk_scale"], 2.4);

  let changelog = files::read_array(&dir.changelog_path()).unwrap();
  assert_eq!(changelog[0]["id"], "v0_3_0");
  assert_eq!(changelog[0]["date"], "2026-01-22");
}

#[test]
fn published_dataset_reloads_clean() {
  let (_tmp, dir) = seeded();
  Importer::new(dir.clone(), defaults()).import_all().unwrap();

  let dataset = load_dataset(&dir).unwrap();
  assert!(validate(&dataset).is_empty());
  assert_eq!(dataset.len(EntityKind::UpgradeCosts), 2);
  assert_eq!(dataset.costs.rows()[1].character_id, CharacterRef::All);
}

#[test]
fn reimport_is_stable() {
  let (_tmp, dir) = seeded();
  let importer = Importer::new(dir.clone(), defaults());
  importer.import_all().unwrap();
  let first = fs::read_to_string(dir.data_path(EntityKind::Characters)).unwrap();
  importer.import_all().unwrap();
  let second = fs::read_to_string(dir.data_path(EntityKind::Characters)).unwrap();

  assert_eq!(first, second);
  assert_eq!(files::read_array(&dir.changelog_path()).unwrap().len(), 1);
}

#[test]
fn mandatory_source_must_exist() {
  let (_tmp, dir) = seeded();
  fs::remove_file(dir.raw_path(EntityKind::Materials)).unwrap();

  let err = Importer::new(dir.clone(), defaults()).import_all().unwrap_err();
  assert!(matches!(err, Error::MissingSource(p) if p == dir.raw_path(EntityKind::Materials)));
  assert!(!dir.data_path(EntityKind::Characters).exists());
}

#[test]
fn optional_source_is_skipped_but_published_rows_are_checked() {
  let (_tmp, dir) = seeded();
  fs::remove_file(dir.raw_path(EntityKind::CharacterSkills)).unwrap();
  write(
    &dir.data_path(EntityKind::CharacterSkills),
    json!([{ "id": "old_s1", "character_id": "retired", "skill_name": "",
             "skill_type": "Active", "description": "",
             "multiplier_data": { "atk_scale": 1.0 }, "cooldown": 0, "cost": 0,
             "hit_count": 1, "version": "0.2.0", "source": "in_game",
             "confidence": "provisional", "updated_at": "2025-12-01" }]),
  );

  let err = Importer::new(dir.clone(), defaults()).import_all().unwrap_err();
  let violations = match err {
    Error::Validation(violations) => violations,
    other => panic!("expected validation failure, got {other:?}"),
  };
  assert_eq!(violations.len(), 1);
  assert_eq!(violations[0].kind, EntityKind::CharacterSkills);
  assert_eq!(violations[0].rule, Rule::UnknownCharacter);

  fs::remove_file(dir.data_path(EntityKind::CharacterSkills)).unwrap();
  let report = Importer::new(dir.clone(), defaults()).import_all().unwrap();
  assert_eq!(report.skipped, [EntityKind::CharacterSkills]);
  assert!(!dir.data_path(EntityKind::CharacterSkills).exists());
}

#[test]
fn one_bad_row_aborts_the_run() {
  let (_tmp, dir) = seeded();
  write(
    &dir.raw_path(EntityKind::CharacterStats),
    json!([
      { "character_id": "perlica", "level": 1 },
      { "level": 10 },
    ]),
  );

  let err = Importer::new(dir.clone(), defaults()).import_all().unwrap_err();
  assert!(matches!(
    err,
    Error::Normalize { index: 1, source: roster_core::Error::MissingRequiredField { .. }, .. }
  ));
  for kind in [EntityKind::Characters, EntityKind::Materials, EntityKind::CharacterStats] {
    assert!(!dir.data_path(kind).exists(), "{kind} was written");
  }
  assert!(!dir.changelog_path().exists());
}

#[test]
fn incomplete_character_is_rejected() {
  let (_tmp, dir) = seeded();
  write(
    &dir.raw_path(EntityKind::Characters),
    json!([{ "id": "perlica", "name": "Perlica", "rarity": 0, "role": "Caster" }]),
  );

  let err = Importer::new(dir.clone(), defaults()).import_all().unwrap_err();
  let fields = match err {
    Error::Normalize {
      index: 0,
      source: roster_core::Error::MissingRequiredField { fields, .. },
      ..
    } => fields,
    other => panic!("expected a rejected character, got {other:?}"),
  };
  assert_eq!(fields, ["rarity", "element", "weapon_type"]);
}

#[test]
fn broken_reference_leaves_data_untouched() {
  let (_tmp, dir) = seeded();
  let importer = Importer::new(dir.clone(), defaults());
  importer.import_all().unwrap();
  let before = fs::read_to_string(dir.data_path(EntityKind::UpgradeCosts)).unwrap();

  write(
    &dir.raw_path(EntityKind::UpgradeCosts),
    json!([{ "id": "lv_1", "character_id": "perlica", "material_id": "unobtainium",
             "amount": 1 }]),
  );
  let err = importer.import_all().unwrap_err();
  let violations = match err {
    Error::Validation(violations) => violations,
    other => panic!("expected validation failure, got {other:?}"),
  };
  assert_eq!(violations[0].to_string(), "upgrade_costs: unknown material_id=unobtainium (id=lv_1)");

  let after = fs::read_to_string(dir.data_path(EntityKind::UpgradeCosts)).unwrap();
  assert_eq!(before, after);
}

#[test]
fn cost_without_material_fails_import() {
  let (_tmp, dir) = seeded();
  write(
    &dir.raw_path(EntityKind::UpgradeCosts),
    json!([{ "id": "lv_nomat", "character_id": "perlica", "from_level": 1,
             "to_level": 20, "amount": 5 }]),
  );

  let err = Importer::new(dir.clone(), defaults()).import_all().unwrap_err();
  let violations = match err {
    Error::Validation(violations) => violations,
    other => panic!("expected validation failure, got {other:?}"),
  };
  let report: Vec<_> = violations.iter().map(ToString::to_string).collect();
  assert_eq!(report, ["upgrade_costs: unknown material_id= (id=lv_nomat)"]);
  assert!(!dir.data_path(EntityKind::UpgradeCosts).exists());
}

#[test]
fn failed_write_leaves_data_untouched() {
  let (_tmp, dir) = seeded();
  let importer = Importer::new(dir.clone(), defaults());
  importer.import_all().unwrap();
  let characters = fs::read_to_string(dir.data_path(EntityKind::Characters)).unwrap();
  let changelog = fs::read_to_string(dir.changelog_path()).unwrap();

  let costs = dir.data_path(EntityKind::UpgradeCosts);
  fs::remove_file(&costs).unwrap();
  fs::create_dir(&costs).unwrap();
  write(
    &dir.raw_path(EntityKind::Characters),
    json!([
      { "id": "perlica", "name": "Perlica", "rarity": 5, "element": "Electric",
        "role": "Caster", "weapon_type": "Arts Unit", "description": "changed" },
      { "name": "Ardelia", "rarity": 6, "element": "Nature",
        "role": "Supporter", "weapon_type": "Arts Unit" },
    ]),
  );

  let next = NormalizeDefaults::new(defaults().today, "0.4.0");
  let err = Importer::new(dir.clone(), next).import_all().unwrap_err();
  assert!(matches!(err, Error::Io { path, .. } if path == costs));

  assert_eq!(
    fs::read_to_string(dir.data_path(EntityKind::Characters)).unwrap(),
    characters
  );
  assert_eq!(fs::read_to_string(dir.changelog_path()).unwrap(), changelog);
  let leftovers = fs::read_dir(dir.root().join("data")).unwrap().count();
  assert_eq!(leftovers, 6);
}

#[test]
fn non_array_source_is_invalid_shape() {
  let (_tmp, dir) = seeded();
  write(&dir.raw_path(EntityKind::Materials), json!({ "id": "t_creds" }));

  let err = Importer::new(dir, defaults()).import_all().unwrap_err();
  assert!(matches!(err, Error::Core(roster_core::Error::InvalidShape { .. })));
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[test]
fn load_keeps_duplicates_for_the_validator() {
  let (_tmp, dir) = seeded();
  Importer::new(dir.clone(), defaults()).import_all().unwrap();

  let path = dir.data_path(EntityKind::Materials);
  let mut rows = files::read_array(&path).unwrap();
  rows.push(rows[0].clone());
  files::write_pretty(&path, &rows).unwrap();

  let dataset = load_dataset(&dir).unwrap();
  assert_eq!(dataset.len(EntityKind::Materials), 3);
  let report: Vec<_> = validate(&dataset).iter().map(ToString::to_string).collect();
  assert_eq!(report, ["materials: duplicated id=protoprism"]);
}

#[test]
fn empty_directory_loads_empty() {
  let tmp = tempfile::tempdir().unwrap();
  let dataset = load_dataset(&DataDir::new(tmp.path())).unwrap();
  assert_eq!(dataset.len(EntityKind::Characters), 0);
}

// ─── Editor ──────────────────────────────────────────────────────────────────

fn form(id: &str, name: &str) -> RawRecord {
  RawRecord::new()
    .with("id", id)
    .with("name", name)
    .with("rarity", "4")
    .with("element", "Heat")
    .with("role", "Striker")
    .with("weapon_type", "Sword")
}

#[test]
fn editor_creates_then_updates() {
  let (_tmp, dir) = seeded();
  let path = dir.raw_path(EntityKind::Characters);

  let (created, outcome) =
    upsert_character(&dir, &form("", "Chen Qianyu"), &defaults()).unwrap();
  assert_eq!(outcome, UpsertOutcome::Created);
  assert_eq!(created.id, "chen_qianyu");
  assert_eq!(created.rarity, 4);
  assert_eq!(ids(&path), ["", "chen_qianyu", "perlica"]);

  let (updated, outcome) = upsert_character(
    &dir,
    &form("Chen Qianyu", "Chen Qianyu").with("description", "Swordswoman"),
    &defaults(),
  )
  .unwrap();
  assert_eq!(outcome, UpsertOutcome::Updated);
  assert_eq!(updated.description, "Swordswoman");
  assert_eq!(files::read_array(&path).unwrap().len(), 3);
}

#[test]
fn editor_matches_rows_identified_by_name() {
  let (_tmp, dir) = seeded();
  let (_, outcome) = upsert_character(&dir, &form("ardelia", "Ardelia"), &defaults()).unwrap();
  assert_eq!(outcome, UpsertOutcome::Updated);
  assert_eq!(ids(&dir.raw_path(EntityKind::Characters)), ["ardelia", "perlica"]);
}

#[test]
fn rejected_edit_leaves_source_unchanged() {
  let (_tmp, dir) = seeded();
  let path = dir.raw_path(EntityKind::Characters);
  let before = fs::read_to_string(&path).unwrap();

  let incomplete = RawRecord::new().with("name", "Nameless");
  let err = upsert_character(&dir, &incomplete, &defaults()).unwrap_err();
  assert!(matches!(
    err,
    Error::Core(roster_core::Error::MissingRequiredField { .. })
  ));
  assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn editor_starts_a_missing_source() {
  let tmp = tempfile::tempdir().unwrap();
  let dir = DataDir::new(tmp.path());
  let (_, outcome) = upsert_character(&dir, &form("x", "Xaihi"), &defaults()).unwrap();
  assert_eq!(outcome, UpsertOutcome::Created);
  assert_eq!(ids(&dir.raw_path(EntityKind::Characters)), ["x"]);
}
