//! Growth-cost aggregation: what a character needs to go from one level (or
//! ascension stage) to another, and what the player is still short of.
//!
//! Cost rows are selected by containment, never prorated: a row contributes
//! only when its whole interval lies inside the requested one.

use std::collections::HashMap;

use roster_core::record::{UpgradeCost, UpgradeType};
use serde::Serialize;

use crate::owned::OwnedMaterials;

/// The `from_level` at which each ascension happens. Stage `s` → `s + 1` is
/// paid by the rows anchored at `ASCENSION_FROM_LEVELS[s]`.
pub const ASCENSION_FROM_LEVELS: [u32; 4] = [20, 40, 60, 80];

/// Highest ascension stage (E4).
pub const MAX_ASCENSION_STAGE: u8 = 4;

// ─── Results ─────────────────────────────────────────────────────────────────

/// Required, owned, and missing quantity of one material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterialNeed {
  pub material_id: String,
  pub required:    u64,
  pub owned:       u64,
  /// `required - owned`, never below zero.
  pub shortage:    u64,
}

/// Totals for one request.
///
/// `found == false` means no cost data matched; callers must not read that as
/// "free".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthCost {
  pub found:        bool,
  pub credit_total: u64,
  /// In order of each material's first appearance among the matched rows.
  pub breakdown:    Vec<MaterialNeed>,
}

impl GrowthCost {
  pub fn not_found() -> Self {
    Self {
      found:        false,
      credit_total: 0,
      breakdown:    Vec::new(),
    }
  }
}

// ─── Level interval ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthQuery<'a> {
  pub character_id:     &'a str,
  pub from_level:       u32,
  pub to_level:         u32,
  /// Also count rows that apply to every character (`character_id = "*"`).
  pub include_wildcard: bool,
}

/// Sum the cost rows of `query.character_id` lying within
/// `[from_level, to_level]`.
///
/// An empty or inverted interval is "not found", as is an interval no row
/// fits in. Rows whose own interval is empty or inverted never contribute.
pub fn aggregate(
  query: &GrowthQuery<'_>,
  costs: &[UpgradeCost],
  owned: &OwnedMaterials,
) -> GrowthCost {
  if query.from_level >= query.to_level {
    return GrowthCost::not_found();
  }
  summarize(
    costs.iter().filter(|cost| {
      cost
        .character_id
        .applies_to(query.character_id, query.include_wildcard)
        && cost.from_level < cost.to_level
        && cost.from_level >= query.from_level
        && cost.to_level <= query.to_level
    }),
    owned,
  )
}

// ─── Ascension stages ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AscensionQuery<'a> {
  pub character_id: &'a str,
  pub from_stage:   u8,
  pub to_stage:     u8,
}

/// Sum the ascension rows needed to go from `from_stage` to `to_stage`.
///
/// Both the character's own rows and rows for every character are counted.
/// Stages past [`MAX_ASCENSION_STAGE`] add nothing.
pub fn aggregate_ascension(
  query: &AscensionQuery<'_>,
  costs: &[UpgradeCost],
  owned: &OwnedMaterials,
) -> GrowthCost {
  if query.from_stage >= query.to_stage {
    return GrowthCost::not_found();
  }
  let anchors: Vec<u32> = ASCENSION_FROM_LEVELS
    .iter()
    .copied()
    .skip(usize::from(query.from_stage))
    .take(usize::from(query.to_stage - query.from_stage))
    .collect();

  summarize(
    costs.iter().filter(|cost| {
      cost.upgrade_type == UpgradeType::Ascension
        && cost.character_id.applies_to(query.character_id, true)
        && anchors.contains(&cost.from_level)
    }),
    owned,
  )
}

// ─── Shared ──────────────────────────────────────────────────────────────────

fn summarize<'a>(
  rows: impl Iterator<Item = &'a UpgradeCost>,
  owned: &OwnedMaterials,
) -> GrowthCost {
  let mut found = false;
  let mut credit_total = 0u64;
  let mut order: Vec<&str> = Vec::new();
  let mut required: HashMap<&str, u64> = HashMap::new();

  for row in rows {
    found = true;
    credit_total = credit_total.saturating_add(row.credit_cost);
    let material_id = row.material_id.as_str();
    let total = required.entry(material_id).or_insert_with(|| {
      order.push(material_id);
      0
    });
    *total = total.saturating_add(row.amount);
  }

  if !found {
    return GrowthCost::not_found();
  }

  let breakdown = order
    .into_iter()
    .map(|material_id| {
      let required = required[material_id];
      let owned = owned.get(material_id);
      MaterialNeed {
        material_id: material_id.to_owned(),
        required,
        owned,
        shortage: required.saturating_sub(owned),
      }
    })
    .collect();

  GrowthCost {
    found,
    credit_total,
    breakdown,
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use pretty_assertions::assert_eq;
  use roster_core::record::{CharacterRef, Confidence};

  use super::*;

  fn row(
    character: &str,
    kind: UpgradeType,
    from: u32,
    to: u32,
    material: &str,
    amount: u64,
    credits: u64,
  ) -> UpgradeCost {
    UpgradeCost {
      id:           format!("{character}_{from}_{to}_{material}"),
      character_id: CharacterRef::from(character.to_owned()),
      upgrade_type: kind,
      from_level:   from,
      to_level:     to,
      material_id:  material.to_owned(),
      amount,
      credit_cost:  credits,
      version:      "0.1.0".into(),
      source:       "in_game".into(),
      confidence:   Confidence::Confirmed,
      updated_at:   NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    }
  }

  fn level(character: &str, from: u32, to: u32, material: &str, amount: u64, credits: u64) -> UpgradeCost {
    row(character, UpgradeType::Level, from, to, material, amount, credits)
  }

  fn query(character_id: &str, from_level: u32, to_level: u32) -> GrowthQuery<'_> {
    GrowthQuery {
      character_id,
      from_level,
      to_level,
      include_wildcard: false,
    }
  }

  #[test]
  fn single_row_with_partial_stock() {
    let costs = vec![level("c1", 1, 20, "m1", 10, 500)];
    let owned: OwnedMaterials = [("m1".to_owned(), 3)].into_iter().collect();

    let result = aggregate(&query("c1", 1, 20), &costs, &owned);
    assert_eq!(result, GrowthCost {
      found:        true,
      credit_total: 500,
      breakdown:    vec![MaterialNeed {
        material_id: "m1".into(),
        required:    10,
        owned:       3,
        shortage:    7,
      }],
    });
  }

  #[test]
  fn sums_per_material_in_first_seen_order() {
    let costs = vec![
      level("c1", 1, 20, "m2", 5, 100),
      level("c1", 1, 20, "m1", 2, 0),
      level("c1", 20, 40, "m2", 7, 300),
      level("c2", 1, 20, "m3", 99, 9_999),
    ];
    let owned: OwnedMaterials = [("m2".to_owned(), 50)].into_iter().collect();

    let result = aggregate(&query("c1", 1, 40), &costs, &owned);
    assert!(result.found);
    assert_eq!(result.credit_total, 400);
    let ids: Vec<_> = result.breakdown.iter().map(|n| n.material_id.as_str()).collect();
    assert_eq!(ids, ["m2", "m1"]);
    assert_eq!(result.breakdown[0].required, 12);
    assert_eq!(result.breakdown[0].shortage, 0);
    assert_eq!(result.breakdown[1].shortage, 2);
  }

  #[test]
  fn rows_must_fit_entirely_inside_the_interval() {
    let costs = vec![level("c1", 1, 20, "m1", 10, 500), level("c1", 20, 40, "m1", 10, 500)];
    let result = aggregate(&query("c1", 10, 40), &costs, &OwnedMaterials::new());
    assert_eq!(result.credit_total, 500);
    assert_eq!(result.breakdown[0].required, 10);

    let none = aggregate(&query("c1", 5, 15), &costs, &OwnedMaterials::new());
    assert_eq!(none, GrowthCost::not_found());
  }

  #[test]
  fn empty_interval_is_not_found() {
    let costs = vec![
      level("c1", 20, 20, "m1", 10, 500),
      level("c1", 1, 20, "m1", 10, 500),
    ];
    for l in [1, 20, 60] {
      let result = aggregate(&query("c1", l, l), &costs, &OwnedMaterials::new());
      assert!(!result.found);
      assert!(result.breakdown.is_empty());
      assert_eq!(result.credit_total, 0);
    }
    assert!(!aggregate(&query("c1", 40, 1), &costs, &OwnedMaterials::new()).found);
  }

  #[test]
  fn wildcard_rows_are_opt_in() {
    let costs = vec![level("*", 1, 20, "m1", 4, 100), level("c1", 1, 20, "m2", 1, 0)];

    let strict = aggregate(&query("c1", 1, 20), &costs, &OwnedMaterials::new());
    assert_eq!(strict.breakdown.len(), 1);
    assert_eq!(strict.credit_total, 0);

    let mut q = query("c1", 1, 20);
    q.include_wildcard = true;
    let wide = aggregate(&q, &costs, &OwnedMaterials::new());
    assert_eq!(wide.breakdown.len(), 2);
    assert_eq!(wide.credit_total, 100);
  }

  #[test]
  fn shortage_never_negative() {
    let costs = vec![level("c1", 1, 20, "m1", 10, 0)];
    for have in [0, 9, 10, 11, 1_000] {
      let owned: OwnedMaterials = [("m1".to_owned(), have)].into_iter().collect();
      let result = aggregate(&query("c1", 1, 20), &costs, &owned);
      let need = &result.breakdown[0];
      assert_eq!(need.shortage, 10u64.saturating_sub(have));
      if have >= 10 {
        assert_eq!(need.shortage, 0);
      }
    }
  }

  #[test]
  fn zero_amount_row_still_counts_credits() {
    let costs = vec![level("c1", 1, 20, "m1", 0, 800)];
    let result = aggregate(&query("c1", 1, 20), &costs, &OwnedMaterials::new());
    assert!(result.found);
    assert_eq!(result.credit_total, 800);
    assert_eq!(result.breakdown, vec![MaterialNeed {
      material_id: "m1".into(),
      required:    0,
      owned:       0,
      shortage:    0,
    }]);
  }

  #[test]
  fn serializes_with_camel_case_total() {
    let value = serde_json::to_value(GrowthCost::not_found()).unwrap();
    assert_eq!(value, serde_json::json!({ "found": false, "creditTotal": 0, "breakdown": [] }));
  }

  fn ascension_costs() -> Vec<UpgradeCost> {
    vec![
      row("*", UpgradeType::Ascension, 20, 20, "shard", 8, 1_600),
      row("*", UpgradeType::Ascension, 40, 40, "shard", 25, 6_500),
      row("c1", UpgradeType::Ascension, 40, 40, "c1_core", 3, 0),
      row("*", UpgradeType::Ascension, 60, 60, "crystal", 10, 18_000),
      row("c2", UpgradeType::Ascension, 60, 60, "c2_core", 9, 0),
      row("*", UpgradeType::Ascension, 80, 80, "crystal", 12, 40_000),
      row("*", UpgradeType::Level, 20, 40, "shard", 1_000, 1_000),
    ]
  }

  fn ascension(from_stage: u8, to_stage: u8) -> AscensionQuery<'static> {
    AscensionQuery {
      character_id: "c1",
      from_stage,
      to_stage,
    }
  }

  #[test]
  fn ascension_spans_anchor_levels() {
    let costs = ascension_costs();
    let result = aggregate_ascension(&ascension(0, 2), &costs, &OwnedMaterials::new());
    assert!(result.found);
    assert_eq!(result.credit_total, 8_100);
    let totals: Vec<_> = result
      .breakdown
      .iter()
      .map(|n| (n.material_id.as_str(), n.required))
      .collect();
    assert_eq!(totals, [("shard", 33), ("c1_core", 3)]);
  }

  #[test]
  fn full_ascension_covers_every_stage() {
    let costs = ascension_costs();
    let result = aggregate_ascension(&ascension(0, 4), &costs, &OwnedMaterials::new());
    assert_eq!(result.credit_total, 1_600 + 6_500 + 18_000 + 40_000);
    let totals: Vec<_> = result
      .breakdown
      .iter()
      .map(|n| (n.material_id.as_str(), n.required))
      .collect();
    assert_eq!(totals, [("shard", 33), ("c1_core", 3), ("crystal", 22)]);
  }

  #[test]
  fn ascension_empty_or_inverted_range_is_not_found() {
    let costs = ascension_costs();
    for (from, to) in [(0, 0), (2, 2), (3, 1)] {
      assert_eq!(
        aggregate_ascension(&ascension(from, to), &costs, &OwnedMaterials::new()),
        GrowthCost::not_found()
      );
    }
  }

  #[test]
  fn ascension_beyond_last_stage_adds_nothing() {
    let costs = ascension_costs();
    let capped = aggregate_ascension(&ascension(3, 4), &costs, &OwnedMaterials::new());
    let beyond = aggregate_ascension(&ascension(3, 9), &costs, &OwnedMaterials::new());
    assert_eq!(capped, beyond);
    assert!(!aggregate_ascension(&ascension(4, 6), &costs, &OwnedMaterials::new()).found);
  }
}
