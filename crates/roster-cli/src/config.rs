//! Layered settings: defaults, then `roster.toml`, then `ROSTER_*` variables.
//! Command-line flags are applied on top by the caller.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "roster.toml";
pub const ENV_PREFIX: &str = "ROSTER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
  /// Data directory containing `raw/` and `data/`.
  #[serde(default = "default_root")]
  pub root:    PathBuf,
  /// Stamped into records that do not carry their own version.
  #[serde(default = "default_version")]
  pub version: String,
}

fn default_root() -> PathBuf { PathBuf::from(".") }

fn default_version() -> String { "0.1.0".to_owned() }

impl Default for CliConfig {
  fn default() -> Self {
    Self {
      root:    default_root(),
      version: default_version(),
    }
  }
}

impl CliConfig {
  /// Read `file` if it exists, then the environment. A missing file is not an
  /// error.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    ::config::Config::builder()
      .add_source(::config::File::from(file).required(false))
      .add_source(::config::Environment::with_prefix(ENV_PREFIX))
      .build()
      .with_context(|| format!("failed to read config from {}", file.display()))?
      .try_deserialize()
      .context("failed to deserialise CliConfig")
  }
}
