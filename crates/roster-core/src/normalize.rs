//! Record normalisers, one per kind, from raw input to canonical records.
//!
//! Every normaliser is a pure function of the raw record and the ambient
//! [`NormalizeDefaults`]. Required fields are checked together so a rejected
//! record reports everything that is wrong with it at once.

use chrono::{DateTime, NaiveDate};

use crate::{
  Error, Result,
  ident::normalize_id,
  raw::RawRecord,
  record::{
    Character, CharacterRef, Confidence, EntityKind, Material, MultiplierData,
    OtherStats, Skill, StatRow, UpgradeCost, UpgradeType,
  },
};

/// `source` for content verified against the game itself.
pub const SOURCE_IN_GAME: &str = "in_game";
/// `source` for content contributed by the community.
pub const SOURCE_COMMUNITY: &str = "community_verification";

// ─── Defaults ────────────────────────────────────────────────────────────────

/// Values filled in when a raw record leaves them out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeDefaults {
  /// Stamped into `updated_at`.
  pub today:   NaiveDate,
  /// Stamped into `version` for kinds that carry one.
  pub version: String,
}

impl NormalizeDefaults {
  pub fn new(today: NaiveDate, version: impl Into<String>) -> Self {
    Self {
      today,
      version: version.into(),
    }
  }
}

// ─── Characters ──────────────────────────────────────────────────────────────

/// Normalise a character. The id falls back to the name; both an id source
/// and a name are required.
pub fn normalize_character(
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<Character> {
  let name = raw.text("name");
  let id_source = raw.text("id").or_else(|| name.clone());

  let mut missing = Vec::new();
  if id_source.is_none() {
    missing.push("id");
  }
  if name.is_none() {
    missing.push("name");
  }
  require(EntityKind::Characters, id_source.as_deref(), &missing)?;

  Ok(Character {
    id:          normalize_id(id_source.as_deref().unwrap_or_default())?,
    name:        name.unwrap_or_default(),
    rarity:      rarity(raw),
    element:     raw.text_or("element", ""),
    role:        raw.text_or("role", ""),
    weapon_type: raw.text_or("weapon_type", ""),
    description: raw.text_or("description", ""),
    icon_url:    raw.text_or("icon_url", ""),
    version:     raw.text_or("version", &defaults.version),
    source:      raw.text_or("source", SOURCE_COMMUNITY),
    confidence:  confidence(raw, Confidence::Provisional)?,
    updated_at:  updated_at(raw, defaults)?,
  })
}

/// The stricter acceptance rule used when characters are published or edited:
/// a character must be fully described, not merely identifiable.
pub fn check_character_complete(character: &Character) -> Result<()> {
  let mut missing = Vec::new();
  if character.name.is_empty() {
    missing.push("name");
  }
  if !(1..=6).contains(&character.rarity) {
    missing.push("rarity");
  }
  if character.element.is_empty() {
    missing.push("element");
  }
  if character.role.is_empty() {
    missing.push("role");
  }
  if character.weapon_type.is_empty() {
    missing.push("weapon_type");
  }
  require(EntityKind::Characters, Some(&character.id), &missing)
}

fn rarity(raw: &RawRecord) -> u8 {
  raw
    .uint("rarity")
    .and_then(|r| u8::try_from(r).ok())
    .unwrap_or(0)
}

// ─── Materials ───────────────────────────────────────────────────────────────

/// Normalise a material. The id falls back to the name.
pub fn normalize_material(
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<Material> {
  let name = raw.text("name");
  let id_source = raw.text("id").or_else(|| name.clone());
  let missing: &[&str] = if id_source.is_none() { &["id"] } else { &[] };
  require(EntityKind::Materials, None, missing)?;

  Ok(Material {
    id:                  normalize_id(id_source.as_deref().unwrap_or_default())?,
    name:                name.unwrap_or_default(),
    category:            raw.text_or("category", "General"),
    icon_url:            raw.text_or("icon_url", ""),
    acquisition_methods: raw.strings("acquisition_methods"),
    drop_locations:      raw.strings("drop_locations"),
    note:                raw.text_or("note", ""),
    source:              raw.text_or("source", SOURCE_IN_GAME),
    confidence:          confidence(raw, Confidence::Confirmed)?,
    updated_at:          updated_at(raw, defaults)?,
  })
}

// ─── Skills ──────────────────────────────────────────────────────────────────

/// Normalise a skill. A flat `atk_scale` is folded into `multiplier_data`
/// when no structured payload is given.
pub fn normalize_skill(
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<Skill> {
  let id_source = raw.text("id");
  let character_source = raw.text("character_id");

  let mut missing = Vec::new();
  if id_source.is_none() {
    missing.push("id");
  }
  if character_source.is_none() {
    missing.push("character_id");
  }
  require(EntityKind::CharacterSkills, id_source.as_deref(), &missing)?;

  Ok(Skill {
    id:              normalize_id(id_source.as_deref().unwrap_or_default())?,
    character_id:    normalize_id(character_source.as_deref().unwrap_or_default())?,
    skill_name:      raw.text_or("skill_name", ""),
    skill_type:      raw.text_or("skill_type", "Active"),
    description:     raw.text_or("description", ""),
    multiplier_data: multiplier_data(raw),
    cooldown:        raw.number("cooldown").unwrap_or(0.0),
    cost:            raw.number("cost").unwrap_or(0.0),
    hit_count:       raw
      .uint("hit_count")
      .and_then(|n| u32::try_from(n).ok())
      .unwrap_or(1),
    version:         raw.text_or("version", &defaults.version),
    source:          raw.text_or("source", SOURCE_COMMUNITY),
    confidence:      confidence(raw, Confidence::Provisional)?,
    updated_at:      updated_at(raw, defaults)?,
  })
}

fn multiplier_data(raw: &RawRecord) -> MultiplierData {
  match raw.object("multiplier_data") {
    Some(nested) => MultiplierData {
      atk_scale: nested.number("atk_scale").unwrap_or(1.0),
      extra:     nested.rest(&["atk_scale"]).into_iter().collect(),
    },
    None => MultiplierData {
      atk_scale: raw.number("atk_scale").unwrap_or(1.0),
      ..MultiplierData::default()
    },
  }
}

// ─── Upgrade costs ───────────────────────────────────────────────────────────

/// Normalise an upgrade cost row. `character_id` may be the wildcard `*`;
/// A missing `material_id` is left empty for the validator to report.
pub fn normalize_cost(
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<UpgradeCost> {
  let id_source = raw.text("id");
  let character_source = raw.text("character_id");

  let mut missing = Vec::new();
  if id_source.is_none() {
    missing.push("id");
  }
  if character_source.is_none() {
    missing.push("character_id");
  }
  require(EntityKind::UpgradeCosts, id_source.as_deref(), &missing)?;

  let character_id = match character_source.as_deref().unwrap_or_default() {
    CharacterRef::WILDCARD => CharacterRef::All,
    other => CharacterRef::Specific(normalize_id(other)?),
  };

  Ok(UpgradeCost {
    id: normalize_id(id_source.as_deref().unwrap_or_default())?,
    character_id,
    upgrade_type: UpgradeType::from(raw.text_or("upgrade_type", "level")),
    from_level: level(raw, "from_level"),
    to_level: level(raw, "to_level"),
    material_id: raw
      .text("material_id")
      .map(|m| normalize_id(&m))
      .transpose()?
      .unwrap_or_default(),
    amount: raw.uint("amount").unwrap_or(0),
    credit_cost: raw.uint("credit_cost").unwrap_or(0),
    version: raw.text_or("version", &defaults.version),
    source: raw.text_or("source", SOURCE_IN_GAME),
    confidence: confidence(raw, Confidence::Confirmed)?,
    updated_at: updated_at(raw, defaults)?,
  })
}

// ─── Stat rows ───────────────────────────────────────────────────────────────

/// Normalise a per-level stat row. Flat `crit_rate`/`crit_damage` are folded
/// into `other_stats` when no structured payload is given.
pub fn normalize_stat(
  raw: &RawRecord,
  defaults: &NormalizeDefaults,
) -> Result<StatRow> {
  let character_source = raw.text("character_id");
  let missing: &[&str] = if character_source.is_none() {
    &["character_id"]
  } else {
    &[]
  };
  require(EntityKind::CharacterStats, None, missing)?;

  Ok(StatRow {
    character_id: normalize_id(character_source.as_deref().unwrap_or_default())?,
    level:        level(raw, "level"),
    hp:           raw.number("hp").unwrap_or(0.0),
    atk:          raw.number("atk").unwrap_or(0.0),
    def:          raw.number("def").unwrap_or(0.0),
    other_stats:  other_stats(raw),
    version:      raw.text_or("version", &defaults.version),
    source:       raw.text_or("source", SOURCE_COMMUNITY),
    confidence:   confidence(raw, Confidence::Provisional)?,
    updated_at:   updated_at(raw, defaults)?,
  })
}

fn other_stats(raw: &RawRecord) -> OtherStats {
  match raw.object("other_stats") {
    Some(nested) => OtherStats {
      crit_rate:   nested.number("crit_rate").unwrap_or(0.0),
      crit_damage: nested.number("crit_damage").unwrap_or(0.0),
      extra:       nested
        .rest(&["crit_rate", "crit_damage"])
        .into_iter()
        .collect(),
    },
    None => OtherStats {
      crit_rate: raw.number("crit_rate").unwrap_or(0.0),
      crit_damage: raw.number("crit_damage").unwrap_or(0.0),
      ..OtherStats::default()
    },
  }
}

// ─── Shared helpers ──────────────────────────────────────────────────────────

fn require(kind: EntityKind, key: Option<&str>, missing: &[&str]) -> Result<()> {
  if missing.is_empty() {
    return Ok(());
  }
  Err(Error::MissingRequiredField {
    kind,
    key: key.unwrap_or_default().to_owned(),
    fields: missing.iter().map(|f| (*f).to_owned()).collect(),
  })
}

/// Levels are positive; zero, missing, and junk all read as level 1.
fn level(raw: &RawRecord, key: &str) -> u32 {
  raw
    .uint(key)
    .and_then(|n| u32::try_from(n).ok())
    .filter(|n| *n > 0)
    .unwrap_or(1)
}

fn confidence(raw: &RawRecord, default: Confidence) -> Result<Confidence> {
  match raw.text("confidence") {
    None => Ok(default),
    Some(text) => text.parse().map_err(|_| Error::InvalidValue {
      field: "confidence".to_owned(),
      value: text,
    }),
  }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn updated_at(raw: &RawRecord, defaults: &NormalizeDefaults) -> Result<NaiveDate> {
  let Some(text) = raw.text("updated_at") else {
    return Ok(defaults.today);
  };
  NaiveDate::parse_from_str(&text, "%Y-%m-%d")
    .or_else(|_| DateTime::parse_from_rfc3339(&text).map(|dt| dt.date_naive()))
    .map_err(|_| Error::InvalidValue {
      field: "updated_at".to_owned(),
      value: text,
    })
}
