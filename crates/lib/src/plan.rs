//! Build plan entries and layer-type merging.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
  #[error("failed to read build plan {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse build plan {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// A requirement for `name`; `metadata.launch` / `metadata.build` say when.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlanEntry {
  pub name: String,
  #[serde(default)]
  pub metadata: toml::Table,
}

impl BuildpackPlanEntry {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      metadata: toml::Table::new(),
    }
  }

  pub fn with_flag(mut self, key: &str, value: bool) -> Self {
    self.metadata.insert(key.to_string(), toml::Value::Boolean(value));
    self
  }

  fn flag(&self, key: &str) -> bool {
    matches!(self.metadata.get(key), Some(toml::Value::Boolean(true)))
  }
}

/// The entries this buildpack is asked to provide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildpackPlan {
  #[serde(default)]
  pub entries: Vec<BuildpackPlanEntry>,
}

impl BuildpackPlan {
  pub fn load(path: &Path) -> Result<Self, PlanError> {
    let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| PlanError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}

/// Merges plan entries into layer visibility.
pub trait EntryResolver {
  /// OR together the `launch` and `build` requirements of every entry named
  /// `name`. Returns `(launch, build)`.
  fn merge_layer_types(&self, name: &str, entries: &[BuildpackPlanEntry]) -> (bool, bool);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Planner;

impl Planner {
  pub fn new() -> Self {
    Self
  }
}

impl EntryResolver for Planner {
  fn merge_layer_types(&self, name: &str, entries: &[BuildpackPlanEntry]) -> (bool, bool) {
    entries
      .iter()
      .filter(|entry| entry.name == name)
      .fold((false, false), |(launch, build), entry| {
        (launch || entry.flag("launch"), build || entry.flag("build"))
      })
  }
}
