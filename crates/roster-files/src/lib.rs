//! File-backed storage for the roster dataset.
//!
//! A data directory holds hand-authored sources under `raw/` and the published
//! dataset under `data/`. This crate moves records between the two: batch
//! import through the normalisers and validator, loading a published dataset
//! back for checking, the release changelog, and single-record edits of the
//! character source.

pub mod changelog;
pub mod dataset;
pub mod editor;
pub mod error;
pub mod import;
pub mod json;
pub mod layout;

pub use dataset::load_dataset;
pub use editor::upsert_character;
pub use error::{Error, Result};
pub use import::{ImportReport, Importer};
pub use layout::DataDir;

#[cfg(test)]
mod tests;
