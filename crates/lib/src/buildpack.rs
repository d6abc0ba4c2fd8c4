//! `buildpack.toml` parsing.
//!
//! Only the parts the build reads are modelled: the `[buildpack]` identity
//! used for the log title, and the `[metadata]` dependency table used for
//! resolution.
//!
//! ```toml
//! [buildpack]
//! id = "example/gotip"
//! name = "Gotip Buildpack"
//! version = "0.1.0"
//!
//! [metadata.default-versions]
//! go = "1.19.*"
//!
//! [[metadata.dependencies]]
//! id = "go"
//! version = "1.19.3"
//! stacks = ["io.buildpacks.stacks.bionic"]
//! uri = "https://example.com/go1.19.3.linux-amd64.tar.gz"
//! checksum = "sha256:..."
//! strip-components = 1
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dependency::Dependency;

#[derive(Debug, Error)]
pub enum BuildpackTomlError {
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Identity of the running buildpack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackInfo {
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub version: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub homepage: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildpackMetadata {
  /// Dependency id to the constraint used when a build asks for `default`.
  #[serde(default)]
  pub default_versions: BTreeMap<String, String>,
  #[serde(default)]
  pub dependencies: Vec<Dependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildpackToml {
  #[serde(default)]
  pub api: Option<String>,
  #[serde(default)]
  pub buildpack: BuildpackInfo,
  #[serde(default)]
  pub metadata: BuildpackMetadata,
}

impl BuildpackToml {
  pub fn load(path: &Path) -> Result<Self, BuildpackTomlError> {
    let content = std::fs::read_to_string(path).map_err(|source| BuildpackTomlError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content).map_err(|source| BuildpackTomlError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
    toml::from_str(content)
  }
}
