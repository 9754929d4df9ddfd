//! `roster` — import, validate, and query the character roster dataset.
//!
//! # Usage
//!
//! ```text
//! roster --root ./site import --version 0.3.0
//! roster validate
//! roster growth --character perlica --from 1 --to 40 --owned owned.json
//! roster damage --atk 1200 --skill-multiplier 2.4 --crit-rate 0.3
//! ```
//!
//! Command output is JSON on stdout. Logs go to stderr.

mod config;

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use roster_calc::{
  AscensionQuery, DamageInput, GrowthQuery, OwnedMaterials, aggregate,
  aggregate_ascension, estimate,
};
use roster_core::{
  ident::normalize_id, normalize::NormalizeDefaults, raw::RawRecord,
  validate::validate,
};
use roster_files::{DataDir, Error as FilesError, Importer, load_dataset, upsert_character};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::config::{CliConfig, DEFAULT_CONFIG_FILE};

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "roster", about = "Character roster data pipeline")]
struct Cli {
  /// Path to a TOML config file (root, version).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Data directory containing `raw/` and `data/`.
  #[arg(long, global = true)]
  root: Option<PathBuf>,

  /// Dataset version stamped into imported records.
  #[arg(long, global = true)]
  version: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Normalise every raw source, validate, and publish to `data/`.
  Import,
  /// Check the published dataset for duplicate ids and broken references.
  Validate,
  /// Materials and credits to level a character between two levels.
  Growth {
    #[arg(long)]
    character:        String,
    #[arg(long)]
    from:             u32,
    #[arg(long)]
    to:               u32,
    /// JSON object of owned quantities by material id.
    #[arg(long, value_name = "FILE")]
    owned:            Option<PathBuf>,
    /// Also count cost rows that apply to every character.
    #[arg(long)]
    include_wildcard: bool,
  },
  /// Materials and credits to ascend a character between two stages (0-4).
  Ascension {
    #[arg(long)]
    character:  String,
    #[arg(long)]
    from_stage: u8,
    #[arg(long)]
    to_stage:   u8,
    #[arg(long, value_name = "FILE")]
    owned:      Option<PathBuf>,
  },
  /// Estimate the damage of one skill use.
  #[command(allow_negative_numbers = true)]
  Damage(DamageArgs),
  /// Add or replace one character in `raw/characters.source.json`.
  UpsertCharacter(CharacterArgs),
}

/// Unset flags take the estimator's defaults.
#[derive(Args, Debug)]
struct DamageArgs {
  #[arg(long)]
  atk:              Option<f64>,
  #[arg(long)]
  skill_multiplier: Option<f64>,
  #[arg(long)]
  crit_rate:        Option<f64>,
  #[arg(long)]
  crit_damage:      Option<f64>,
  #[arg(long)]
  element_modifier: Option<f64>,
  #[arg(long)]
  flat_buff:        Option<f64>,
  #[arg(long)]
  percent_buff:     Option<f64>,
  #[arg(long)]
  enemy_def:        Option<f64>,
  #[arg(long)]
  enemy_resist:     Option<f64>,
  #[arg(long)]
  hit_count:        Option<f64>,
}

impl DamageArgs {
  fn into_input(self) -> DamageInput {
    let d = DamageInput::default();
    DamageInput {
      atk:              self.atk.unwrap_or(d.atk),
      skill_multiplier: self.skill_multiplier.unwrap_or(d.skill_multiplier),
      crit_rate:        self.crit_rate.unwrap_or(d.crit_rate),
      crit_damage:      self.crit_damage.unwrap_or(d.crit_damage),
      element_modifier: self.element_modifier.unwrap_or(d.element_modifier),
      flat_buff:        self.flat_buff.unwrap_or(d.flat_buff),
      percent_buff:     self.percent_buff.unwrap_or(d.percent_buff),
      enemy_def:        self.enemy_def.unwrap_or(d.enemy_def),
      enemy_resist:     self.enemy_resist.unwrap_or(d.enemy_resist),
      hit_count:        self.hit_count.unwrap_or(d.hit_count),
    }
  }
}

/// Form fields of the character editor. The id falls back to the name.
#[derive(Args, Debug)]
struct CharacterArgs {
  #[arg(long)]
  id:          Option<String>,
  #[arg(long)]
  name:        Option<String>,
  #[arg(long)]
  rarity:      Option<String>,
  #[arg(long)]
  element:     Option<String>,
  #[arg(long)]
  role:        Option<String>,
  #[arg(long)]
  weapon_type: Option<String>,
  #[arg(long)]
  description: Option<String>,
  #[arg(long)]
  icon_url:    Option<String>,
  #[arg(long)]
  source:      Option<String>,
  #[arg(long)]
  confidence:  Option<String>,
  #[arg(long)]
  updated_at:  Option<String>,
}

impl CharacterArgs {
  fn into_raw(self) -> RawRecord {
    [
      ("id", self.id),
      ("name", self.name),
      ("rarity", self.rarity),
      ("element", self.element),
      ("role", self.role),
      ("weapon_type", self.weapon_type),
      ("description", self.description),
      ("icon_url", self.icon_url),
      ("source", self.source),
      ("confidence", self.confidence),
      ("updated_at", self.updated_at),
    ]
    .into_iter()
    .filter_map(|(key, value)| Some((key, value?)))
    .fold(RawRecord::new(), |raw, (key, value)| raw.with(key, value))
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  match run(Cli::parse()) {
    Ok(code) => code,
    Err(err) => {
      error!("{err:#}");
      ExitCode::FAILURE
    }
  }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
  let file = cli
    .config
    .clone()
    .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
  let mut settings = CliConfig::load(&file)?;
  // Flags override config, which overrides defaults.
  if let Some(root) = cli.root {
    settings.root = root;
  }
  if let Some(version) = cli.version {
    settings.version = version;
  }

  let dir = DataDir::new(&settings.root);
  let defaults = NormalizeDefaults::new(Local::now().date_naive(), &settings.version);

  match cli.command {
    Command::Import => import(dir, defaults),
    Command::Validate => check(&dir),
    Command::Growth {
      character,
      from,
      to,
      owned,
      include_wildcard,
    } => {
      let character_id = normalize_id(&character)?;
      let costs = load_dataset(&dir)?.costs.into_rows();
      let result = aggregate(
        &GrowthQuery {
          character_id: &character_id,
          from_level: from,
          to_level: to,
          include_wildcard,
        },
        &costs,
        &read_owned(owned.as_deref())?,
      );
      print_json(&result)?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Ascension {
      character,
      from_stage,
      to_stage,
      owned,
    } => {
      let character_id = normalize_id(&character)?;
      let costs = load_dataset(&dir)?.costs.into_rows();
      let result = aggregate_ascension(
        &AscensionQuery {
          character_id: &character_id,
          from_stage,
          to_stage,
        },
        &costs,
        &read_owned(owned.as_deref())?,
      );
      print_json(&result)?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Damage(args) => {
      print_json(&estimate(&args.into_input()))?;
      Ok(ExitCode::SUCCESS)
    }
    Command::UpsertCharacter(args) => {
      let (character, outcome) = upsert_character(&dir, &args.into_raw(), &defaults)?;
      print_json(&json!({ "outcome": outcome.to_string(), "character": character }))?;
      Ok(ExitCode::SUCCESS)
    }
  }
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn import(dir: DataDir, defaults: NormalizeDefaults) -> anyhow::Result<ExitCode> {
  match Importer::new(dir, defaults).import_all() {
    Ok(report) => {
      print_json(&report)?;
      Ok(ExitCode::SUCCESS)
    }
    Err(FilesError::Validation(violations)) => {
      for v in &violations {
        println!("{v}");
      }
      error!(count = violations.len(), "import aborted, nothing was written");
      Ok(ExitCode::FAILURE)
    }
    Err(err) => Err(err).context("import failed"),
  }
}

fn check(dir: &DataDir) -> anyhow::Result<ExitCode> {
  let dataset = load_dataset(dir).context("failed to load published dataset")?;
  let violations = validate(&dataset);
  if violations.is_empty() {
    info!("validation passed");
    return Ok(ExitCode::SUCCESS);
  }
  for v in &violations {
    println!("{v}");
  }
  error!(count = violations.len(), "validation failed");
  Ok(ExitCode::FAILURE)
}

fn read_owned(path: Option<&Path>) -> anyhow::Result<OwnedMaterials> {
  let Some(path) = path else {
    return Ok(OwnedMaterials::new());
  };
  let text = std::fs::read_to_string(path)
    .with_context(|| format!("reading owned quantities from {}", path.display()))?;
  OwnedMaterials::parse(&text)
    .with_context(|| format!("parsing owned quantities in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
