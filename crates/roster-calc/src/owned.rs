//! Quantities of each material a player already holds.

use std::collections::HashMap;

use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnedMaterials(HashMap<String, u64>);

impl OwnedMaterials {
  pub fn new() -> Self { Self::default() }

  /// Read a `{ material_id: quantity }` object. Quantities may be numbers or
  /// numeric strings; anything else, including negatives, counts as zero.
  pub fn from_json(value: &Value) -> Result<Self> {
    let map = match value {
      Value::Object(map) => map,
      Value::Null => return Ok(Self::default()),
      Value::Array(_) => return Err(Error::InvalidShape("an array")),
      Value::String(_) => return Err(Error::InvalidShape("a string")),
      Value::Number(_) => return Err(Error::InvalidShape("a number")),
      Value::Bool(_) => return Err(Error::InvalidShape("a boolean")),
    };
    Ok(
      map
        .iter()
        .map(|(id, qty)| (id.clone(), coerce_quantity(qty)))
        .collect(),
    )
  }

  pub fn parse(text: &str) -> Result<Self> {
    if text.trim().is_empty() {
      return Ok(Self::default());
    }
    Self::from_json(&serde_json::from_str(text)?)
  }

  pub fn insert(&mut self, material_id: impl Into<String>, quantity: u64) {
    self.0.insert(material_id.into(), quantity);
  }

  /// Zero for materials the player has none of.
  pub fn get(&self, material_id: &str) -> u64 {
    self.0.get(material_id).copied().unwrap_or(0)
  }
}

impl FromIterator<(String, u64)> for OwnedMaterials {
  fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

fn coerce_quantity(value: &Value) -> u64 {
  let n = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().parse::<f64>().ok(),
    _ => None,
  };
  match n {
    Some(n) if n.is_finite() && n > 0.0 => n.trunc() as u64,
    _ => 0,
  }
}
