//! JSON file helpers. Every published file is a pretty-printed document with
//! two-space indentation and a trailing newline.

use std::{
  fs,
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use roster_core::raw::RawRecord;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::{Error, Result};

pub fn read_value(path: &Path) -> Result<Value> {
  let text = fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.to_owned(),
    source,
  })?;
  serde_json::from_str(&text).map_err(|source| Error::Json {
    path: path.to_owned(),
    source,
  })
}

/// Read a top-level array of raw records.
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
  let value = read_value(path)?;
  Ok(RawRecord::from_array(value, &path.display().to_string())?)
}

/// Read a top-level array, keeping each element as it is.
pub fn read_array(path: &Path) -> Result<Vec<Value>> {
  match read_value(path)? {
    Value::Array(items) => Ok(items),
    _ => Err(
      roster_core::Error::InvalidShape {
        context:  path.display().to_string(),
        expected: "an array",
      }
      .into(),
    ),
  }
}

/// Read a file of already-canonical rows.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
  let value = read_value(path)?;
  serde_json::from_value(value).map_err(|source| Error::Json {
    path: path.to_owned(),
    source,
  })
}

/// A fully written file waiting in its target's directory. Dropping it
/// without [`Staged::commit`] discards it.
#[derive(Debug)]
pub struct Staged {
  file:   NamedTempFile,
  target: PathBuf,
}

impl Staged {
  pub fn target(&self) -> &Path { &self.target }

  /// Rename the staged file over its target.
  pub fn commit(self) -> Result<()> {
    let Self { file, target } = self;
    file.persist(&target).map_err(|err| Error::Io {
      path:   target,
      source: err.error,
    })?;
    Ok(())
  }
}

/// Serialise `value` as pretty JSON into a temporary file next to `path`,
/// creating parent directories as needed. `path` itself is not touched.
pub fn stage_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<Staged> {
  if path.is_dir() {
    return Err(Error::Io {
      path:   path.to_owned(),
      source: io::Error::other("target is a directory"),
    });
  }
  let parent = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  fs::create_dir_all(parent).map_err(|source| Error::Io {
    path: parent.to_owned(),
    source,
  })?;

  let mut text =
    serde_json::to_string_pretty(value).map_err(|source| Error::Json {
      path: path.to_owned(),
      source,
    })?;
  text.push('\n');

  let mut file = NamedTempFile::new_in(parent).map_err(|source| Error::Io {
    path: parent.to_owned(),
    source,
  })?;
  file.write_all(text.as_bytes()).map_err(|source| Error::Io {
    path: file.path().to_owned(),
    source,
  })?;
  Ok(Staged {
    file,
    target: path.to_owned(),
  })
}

/// Write `value` as pretty JSON. The target is replaced in one rename.
pub fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
  stage_pretty(path, value)?.commit()
}
