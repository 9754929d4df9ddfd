//! Canonical record types: the validated shape of every entity kind.
//!
//! Field order here is the field order of the published JSON, so the derived
//! `Serialize` impls produce the canonical output directly.

use std::{collections::BTreeMap, fmt};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ─── Entity kinds ────────────────────────────────────────────────────────────

/// The five kinds of record in a dataset. The snake-case name doubles as the
/// file stem of the kind's data file.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  Characters,
  Materials,
  CharacterSkills,
  UpgradeCosts,
  CharacterStats,
}

impl EntityKind {
  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Provenance ──────────────────────────────────────────────────────────────

/// How far a record has been verified.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Confidence {
  /// Checked against an authoritative in-game source.
  Confirmed,
  /// Community observation, not yet verified.
  Provisional,
}

// ─── Character references ────────────────────────────────────────────────────

/// The character an upgrade cost applies to. Serialised as the plain id, with
/// `"*"` standing for every character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CharacterRef {
  All,
  Specific(String),
}

impl CharacterRef {
  pub const WILDCARD: &'static str = "*";

  pub fn as_str(&self) -> &str {
    match self {
      Self::All => Self::WILDCARD,
      Self::Specific(id) => id,
    }
  }

  /// Whether a row carrying this reference applies to `character_id`.
  /// `All` only matches when `include_all` is set.
  pub fn applies_to(&self, character_id: &str, include_all: bool) -> bool {
    match self {
      Self::All => include_all,
      Self::Specific(id) => id == character_id,
    }
  }
}

impl From<String> for CharacterRef {
  fn from(s: String) -> Self {
    if s == Self::WILDCARD { Self::All } else { Self::Specific(s) }
  }
}

impl From<CharacterRef> for String {
  fn from(r: CharacterRef) -> Self {
    match r {
      CharacterRef::All => CharacterRef::WILDCARD.to_owned(),
      CharacterRef::Specific(id) => id,
    }
  }
}

impl fmt::Display for CharacterRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Upgrade types ───────────────────────────────────────────────────────────

/// What an upgrade cost row pays for. The set is open; unknown types are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UpgradeType {
  Level,
  Ascension,
  Skill,
  Other(String),
}

impl UpgradeType {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Level => "level",
      Self::Ascension => "ascension",
      Self::Skill => "skill",
      Self::Other(s) => s,
    }
  }
}

impl From<String> for UpgradeType {
  fn from(s: String) -> Self {
    match s.to_ascii_lowercase().as_str() {
      "level" => Self::Level,
      "ascension" => Self::Ascension,
      "skill" => Self::Skill,
      _ => Self::Other(s),
    }
  }
}

impl From<UpgradeType> for String {
  fn from(t: UpgradeType) -> Self {
    match t {
      UpgradeType::Other(s) => s,
      known => known.as_str().to_owned(),
    }
  }
}

impl fmt::Display for UpgradeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Character ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub id:          String,
  pub name:        String,
  /// 1–6 once complete; 0 means not yet known.
  pub rarity:      u8,
  pub element:     String,
  pub role:        String,
  pub weapon_type: String,
  pub description: String,
  pub icon_url:    String,
  pub version:     String,
  pub source:      String,
  pub confidence:  Confidence,
  pub updated_at:  NaiveDate,
}

// ─── Material ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
  pub id:                  String,
  pub name:                String,
  pub category:            String,
  pub icon_url:            String,
  pub acquisition_methods: Vec<String>,
  pub drop_locations:      Vec<String>,
  pub note:                String,
  pub source:              String,
  pub confidence:          Confidence,
  pub updated_at:          NaiveDate,
}

// ─── Skill ───────────────────────────────────────────────────────────────────

/// Scaling data for a skill. Keys beyond `atk_scale` are carried untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierData {
  #[serde(default = "default_atk_scale")]
  pub atk_scale: f64,
  #[serde(flatten)]
  pub extra:     BTreeMap<String, Value>,
}

fn default_atk_scale() -> f64 { 1.0 }

impl Default for MultiplierData {
  fn default() -> Self {
    Self {
      atk_scale: default_atk_scale(),
      extra:     BTreeMap::new(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
  pub id:              String,
  pub character_id:    String,
  pub skill_name:      String,
  pub skill_type:      String,
  pub description:     String,
  pub multiplier_data: MultiplierData,
  /// Seconds.
  pub cooldown:        f64,
  pub cost:            f64,
  pub hit_count:       u32,
  pub version:         String,
  pub source:          String,
  pub confidence:      Confidence,
  pub updated_at:      NaiveDate,
}

// ─── Upgrade cost ────────────────────────────────────────────────────────────

/// One material line of one upgrade step. Several rows may share a step when
/// it consumes several materials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeCost {
  pub id:           String,
  pub character_id: CharacterRef,
  pub upgrade_type: UpgradeType,
  pub from_level:   u32,
  pub to_level:     u32,
  /// Empty when the source left it out; the validator reports that.
  #[serde(default)]
  pub material_id:  String,
  pub amount:       u64,
  pub credit_cost:  u64,
  pub version:      String,
  pub source:       String,
  pub confidence:   Confidence,
  pub updated_at:   NaiveDate,
}

// ─── Stat row ────────────────────────────────────────────────────────────────

/// Secondary stats. Keys beyond the crit pair are carried untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherStats {
  #[serde(default)]
  pub crit_rate:   f64,
  #[serde(default)]
  pub crit_damage: f64,
  #[serde(flatten)]
  pub extra:       BTreeMap<String, Value>,
}

/// Base stats of a character at one level. Identified by
/// `(character_id, level)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRow {
  pub character_id: String,
  pub level:        u32,
  pub hp:           f64,
  pub atk:          f64,
  pub def:          f64,
  pub other_stats:  OtherStats,
  pub version:      String,
  pub source:       String,
  pub confidence:   Confidence,
  pub updated_at:   NaiveDate,
}
