//! Keyed stores: ordered collections of records with upsert by key.
//!
//! A [`KeyedStore`] keeps rows in presentation order and an index from key to
//! position, so upserts do not scan. Bulk-loaded content is taken as-is, which
//! means a store may briefly hold several rows with the same key; reporting
//! those is the validator's job, and the index always points at the first.

use std::{
  cmp::Ordering,
  collections::HashMap,
  fmt,
  hash::Hash,
};

use feruca::Collator;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
  Error, Result,
  record::{Character, EntityKind, Material, Skill, StatRow, UpgradeCost},
};

// ─── Keys ────────────────────────────────────────────────────────────────────

/// How a kind's rows are ordered for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrder {
  /// Insertion order; updates keep their position.
  Insertion,
  /// Re-sorted by display name after every mutation.
  DisplayName,
}

/// A record kind that can live in a [`KeyedStore`].
pub trait Keyed {
  type Key: Clone + Eq + Hash + fmt::Debug + fmt::Display;

  const KIND: EntityKind;
  const ORDER: StoreOrder = StoreOrder::Insertion;

  fn key(&self) -> Self::Key;

  /// Only consulted for [`StoreOrder::DisplayName`] kinds.
  fn display_name(&self) -> &str { "" }
}

/// Compound key of a [`StatRow`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatKey {
  pub character_id: String,
  pub level:        u32,
}

impl fmt::Display for StatKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}@{}", self.character_id, self.level)
  }
}

impl Keyed for Character {
  type Key = String;

  const KIND: EntityKind = EntityKind::Characters;
  const ORDER: StoreOrder = StoreOrder::DisplayName;

  fn key(&self) -> String { self.id.clone() }

  fn display_name(&self) -> &str { &self.name }
}

impl Keyed for Material {
  type Key = String;

  const KIND: EntityKind = EntityKind::Materials;
  const ORDER: StoreOrder = StoreOrder::DisplayName;

  fn key(&self) -> String { self.id.clone() }

  fn display_name(&self) -> &str { &self.name }
}

impl Keyed for Skill {
  type Key = String;

  const KIND: EntityKind = EntityKind::CharacterSkills;

  fn key(&self) -> String { self.id.clone() }
}

impl Keyed for UpgradeCost {
  type Key = String;

  const KIND: EntityKind = EntityKind::UpgradeCosts;

  fn key(&self) -> String { self.id.clone() }
}

impl Keyed for StatRow {
  type Key = StatKey;

  const KIND: EntityKind = EntityKind::CharacterStats;

  fn key(&self) -> StatKey {
    StatKey {
      character_id: self.character_id.clone(),
      level:        self.level,
    }
  }
}

/// Collation order of display names (Unicode collation, root tailoring), so
/// accented and kana names sort where a reader expects them. Ties fall back to
/// the exact text so the order is total.
pub fn display_order(a: &str, b: &str) -> Ordering {
  Collator::default()
    .collate(a, b)
    .then_with(|| a.cmp(b))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// What an [`KeyedStore::upsert`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
  Created,
  Updated,
}

impl fmt::Display for UpsertOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Created => "created",
      Self::Updated => "updated",
    })
  }
}

#[derive(Debug, Clone)]
pub struct KeyedStore<R: Keyed> {
  rows:  Vec<R>,
  index: HashMap<R::Key, usize>,
}

impl<R: Keyed> KeyedStore<R> {
  pub fn new() -> Self {
    Self {
      rows:  Vec::new(),
      index: HashMap::new(),
    }
  }

  /// Build a store from externally supplied rows (a data file, a cache).
  /// Nothing is validated; duplicate keys are kept.
  pub fn from_rows(rows: Vec<R>) -> Self {
    let mut store = Self::new();
    store.replace_all(rows);
    store
  }

  /// Replace the whole content with `rows`.
  pub fn replace_all(&mut self, rows: Vec<R>) {
    self.rows = rows;
    self.reorder();
  }

  /// Insert or fully replace the row with the same key.
  ///
  /// An existing row keeps its position (subject to display-name ordering);
  /// a new row is appended. Applying the same row twice leaves the store as
  /// applying it once did.
  pub fn upsert(&mut self, row: R) -> UpsertOutcome {
    let outcome = match self.index.get(&row.key()) {
      Some(&pos) => {
        self.rows[pos] = row;
        UpsertOutcome::Updated
      }
      None => {
        self.index.insert(row.key(), self.rows.len());
        self.rows.push(row);
        UpsertOutcome::Created
      }
    };
    if R::ORDER == StoreOrder::DisplayName {
      self.reorder();
    }
    outcome
  }

  /// Append a row whose key must not exist yet.
  pub fn insert(&mut self, row: R) -> Result<()> {
    let key = row.key();
    if self.index.contains_key(&key) {
      return Err(Error::DuplicateKey {
        kind: R::KIND,
        key:  key.to_string(),
      });
    }
    self.upsert(row);
    Ok(())
  }

  pub fn get(&self, key: &R::Key) -> Option<&R> {
    self.index.get(key).map(|&pos| &self.rows[pos])
  }

  pub fn contains_key(&self, key: &R::Key) -> bool { self.index.contains_key(key) }

  pub fn rows(&self) -> &[R] { &self.rows }

  pub fn iter(&self) -> std::slice::Iter<'_, R> { self.rows.iter() }

  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn into_rows(self) -> Vec<R> { self.rows }

  /// Stable re-sort with a caller-supplied order, e.g. stat rows by
  /// `(character_id, level)` before publishing.
  pub fn sort_by<F>(&mut self, compare: F)
  where
    F: FnMut(&R, &R) -> Ordering,
  {
    self.rows.sort_by(compare);
    self.rebuild_index();
  }

  fn reorder(&mut self) {
    if R::ORDER == StoreOrder::DisplayName {
      self
        .rows
        .sort_by(|a, b| display_order(a.display_name(), b.display_name()));
    }
    self.rebuild_index();
  }

  fn rebuild_index(&mut self) {
    self.index.clear();
    for (pos, row) in self.rows.iter().enumerate() {
      self.index.entry(row.key()).or_insert(pos);
    }
  }
}

impl<R: Keyed> Default for KeyedStore<R> {
  fn default() -> Self { Self::new() }
}

impl<R: Keyed + PartialEq> PartialEq for KeyedStore<R> {
  fn eq(&self, other: &Self) -> bool { self.rows == other.rows }
}

impl<'a, R: Keyed> IntoIterator for &'a KeyedStore<R> {
  type IntoIter = std::slice::Iter<'a, R>;
  type Item = &'a R;

  fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}

impl<R: Keyed> FromIterator<R> for KeyedStore<R> {
  fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
    Self::from_rows(iter.into_iter().collect())
  }
}

impl<R: Keyed + Serialize> Serialize for KeyedStore<R> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.rows.serialize(serializer)
  }
}

impl<'de, R: Keyed + Deserialize<'de>> Deserialize<'de> for KeyedStore<R> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Vec::<R>::deserialize(deserializer).map(Self::from_rows)
  }
}

// ─── Dataset ─────────────────────────────────────────────────────────────────

/// The five stores of one pipeline run or editing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
  pub characters: KeyedStore<Character>,
  pub materials:  KeyedStore<Material>,
  pub skills:     KeyedStore<Skill>,
  pub costs:      KeyedStore<UpgradeCost>,
  pub stats:      KeyedStore<StatRow>,
}

impl Dataset {
  pub fn new() -> Self { Self::default() }

  pub fn len(&self, kind: EntityKind) -> usize {
    match kind {
      EntityKind::Characters => self.characters.len(),
      EntityKind::Materials => self.materials.len(),
      EntityKind::CharacterSkills => self.skills.len(),
      EntityKind::UpgradeCosts => self.costs.len(),
      EntityKind::CharacterStats => self.stats.len(),
    }
  }

  /// Order stat rows by character, then level.
  pub fn sort_stats(&mut self) {
    self.stats.sort_by(|a, b| {
      a.character_id
        .cmp(&b.character_id)
        .then(a.level.cmp(&b.level))
    });
  }
}
