//! Canonical identifiers.
//!
//! Every id in the dataset is lower-case, non-empty, and drawn from
//! `[a-z0-9_]`. Free-form human input (an explicit id, or a display name when
//! no id was given) is folded into that alphabet here.

use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

/// A run of characters outside the identifier alphabet.
static DISALLOWED_RUN: LazyLock<Result<Regex, regex::Error>> =
  LazyLock::new(|| Regex::new("[^a-z0-9_]+"));

/// Turn free-form input into a canonical identifier.
///
/// The input is trimmed and lower-cased, every run of characters outside
/// `[a-z0-9_]` becomes a single `_`, and leading/trailing underscores are
/// stripped.
///
/// ```
/// assert_eq!(roster_core::ident::normalize_id("  Perlica #1! ").unwrap(), "perlica_1");
/// ```
pub fn normalize_id(input: &str) -> Result<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidIdentifier {
      input: input.to_owned(),
    });
  }

  let disallowed = DISALLOWED_RUN
    .as_ref()
    .map_err(|err| Error::Pattern(err.clone()))?;
  let lowered = trimmed.to_lowercase();
  let folded = disallowed.replace_all(&lowered, "_");

  let canonical = folded.trim_matches('_');
  if canonical.is_empty() {
    return Err(Error::InvalidIdentifier {
      input: input.to_owned(),
    });
  }
  Ok(canonical.to_owned())
}

/// Whether `id` is already in canonical form.
pub fn is_canonical(id: &str) -> bool {
  !id.is_empty()
    && id.chars().all(is_id_char)
    && !id.starts_with('_')
    && !id.ends_with('_')
}

fn is_id_char(ch: char) -> bool {
  ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_'
}
