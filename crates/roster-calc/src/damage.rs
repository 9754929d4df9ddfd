//! Damage estimation for a single skill use.
//!
//! ```text
//! buffed_atk     = (atk + flat_buff) * (1 + percent_buff)
//! defense_factor = max(1 - enemy_def / (enemy_def + 1000), 0.05)
//! resist_factor  = max(1 - enemy_resist, 0)
//! non_crit       = buffed_atk * skill_multiplier * element_modifier
//!                  * defense_factor * resist_factor
//! expected       = non_crit * (1 - crit_rate) + non_crit * (1 + crit_damage) * crit_rate
//! ```
//!
//! Only the two factors are clamped. Rates and buffs outside their natural
//! range flow through the arithmetic unchanged; clamp user input upstream.

use serde::{Deserialize, Serialize};

/// Defense needed to halve damage.
pub const DEFENSE_SCALE: f64 = 1000.0;

/// Share of damage that always gets through, however high the defense.
pub const MIN_DEFENSE_FACTOR: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DamageInput {
  pub atk:              f64,
  pub skill_multiplier: f64,
  pub crit_rate:        f64,
  pub crit_damage:      f64,
  pub element_modifier: f64,
  pub flat_buff:        f64,
  pub percent_buff:     f64,
  pub enemy_def:        f64,
  pub enemy_resist:     f64,
  pub hit_count:        f64,
}

impl Default for DamageInput {
  fn default() -> Self {
    Self {
      atk:              0.0,
      skill_multiplier: 1.0,
      crit_rate:        0.0,
      crit_damage:      0.5,
      element_modifier: 1.0,
      flat_buff:        0.0,
      percent_buff:     0.0,
      enemy_def:        0.0,
      enemy_resist:     0.0,
      hit_count:        1.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DamageEstimate {
  /// Damage of one non-critical hit.
  pub per_hit:               f64,
  pub total:                 f64,
  /// Crit-weighted average damage of one hit.
  pub expected_crit_per_hit: f64,
  pub expected_crit_total:   f64,
}

pub fn defense_factor(enemy_def: f64) -> f64 {
  (1.0 - enemy_def / (enemy_def + DEFENSE_SCALE)).max(MIN_DEFENSE_FACTOR)
}

pub fn resist_factor(enemy_resist: f64) -> f64 { (1.0 - enemy_resist).max(0.0) }

pub fn estimate(input: &DamageInput) -> DamageEstimate {
  let buffed_atk = (input.atk + input.flat_buff) * (1.0 + input.percent_buff);
  let non_crit = buffed_atk
    * input.skill_multiplier
    * input.element_modifier
    * defense_factor(input.enemy_def)
    * resist_factor(input.enemy_resist);
  let crit = non_crit * (1.0 + input.crit_damage);
  let expected = non_crit * (1.0 - input.crit_rate) + crit * input.crit_rate;

  DamageEstimate {
    per_hit:               non_crit,
    total:                 non_crit * input.hit_count,
    expected_crit_per_hit: expected,
    expected_crit_total:   expected * input.hit_count,
  }
}
