//! Core types, normalisation and validation for the roster dataset.
//!
//! This crate is deliberately free of file-system and process concerns. Raw
//! records enter through [`raw::RawRecord`], are turned into strict records by
//! [`normalize`], held in [`store::KeyedStore`]s, and checked as a whole by
//! [`validate::validate`].

pub mod error;
pub mod ident;
pub mod normalize;
pub mod raw;
pub mod record;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
