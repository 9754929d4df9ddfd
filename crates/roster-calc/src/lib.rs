//! Growth-cost and damage calculators over roster data.
//!
//! Pure synchronous functions; no I/O. Out-of-range numeric input is never an
//! error here. Requests that cannot be answered come back as "not found"
//! results instead.

pub mod damage;
pub mod error;
pub mod growth;
pub mod owned;

pub use damage::{DamageEstimate, DamageInput, estimate};
pub use error::{Error, Result};
pub use growth::{
  AscensionQuery, GrowthCost, GrowthQuery, MaterialNeed, aggregate, aggregate_ascension,
};
pub use owned::OwnedMaterials;
