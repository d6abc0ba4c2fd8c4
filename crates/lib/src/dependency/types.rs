use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::buildpack::BuildpackTomlError;

/// Resolved metadata for one installable version of a dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Dependency {
  pub id: String,
  #[serde(default)]
  pub name: String,
  pub version: String,
  #[serde(default)]
  pub stacks: Vec<String>,
  #[serde(default)]
  pub uri: String,
  /// `<algorithm>:<hex>`, e.g. `sha256:9f2a...`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub checksum: Option<String>,
  /// Older buildpacks carry a bare sha256 hex instead of `checksum`.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sha256: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_checksum: Option<String>,
  #[serde(default, rename = "source_sha256", skip_serializing_if = "Option::is_none")]
  pub source_sha256: Option<String>,
  #[serde(default, rename = "deprecation_date", skip_serializing_if = "Option::is_none")]
  pub deprecation_date: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub licenses: Vec<String>,
  #[serde(default)]
  pub strip_components: usize,
}

impl Dependency {
  /// The expected sha256 hex digest, if the dependency declares one.
  ///
  /// Returns `Err` with the raw checksum when it uses another algorithm.
  pub fn sha256_hex(&self) -> Result<Option<&str>, &str> {
    match &self.checksum {
      Some(checksum) => match checksum.split_once(':') {
        Some(("sha256", hex)) => Ok(Some(hex)),
        Some(_) => Err(checksum.as_str()),
        None => Ok(Some(checksum.as_str())),
      },
      None => Ok(self.sha256.as_deref()),
    }
  }

  /// Whether this dependency can be installed on `stack`.
  pub fn supports_stack(&self, stack: &str) -> bool {
    self.stacks.iter().any(|s| s == stack || s == "*")
  }
}

/// Errors that can occur while resolving or delivering a dependency.
#[derive(Debug, Error)]
pub enum DependencyError {
  #[error(transparent)]
  BuildpackToml(#[from] BuildpackTomlError),

  #[error("invalid version constraint {constraint:?}: {source}")]
  InvalidConstraint {
    constraint: String,
    #[source]
    source: semver::Error,
  },

  #[error("dependency {id:?} has invalid version {version:?}: {source}")]
  InvalidVersion {
    id: String,
    version: String,
    #[source]
    source: semver::Error,
  },

  #[error(
    "failed to satisfy {id:?} dependency version constraint {constraint:?}: no compatible versions on {stack:?} stack. Supported versions are: [{}]",
    .supported.join(", ")
  )]
  NoCompatibleVersion {
    id: String,
    constraint: String,
    stack: String,
    supported: Vec<String>,
  },

  #[error("failed to fetch {uri}: {message}")]
  Fetch { uri: String, message: String },

  #[error("unsupported dependency uri: {0}")]
  UnsupportedUri(String),

  #[error("dependency {id:?} has no checksum")]
  MissingChecksum { id: String },

  #[error("dependency {id:?} has unsupported checksum {checksum:?}")]
  UnsupportedChecksum { id: String, checksum: String },

  #[error("checksum mismatch for {uri}: expected {expected}, got {actual}")]
  ChecksumMismatch {
    uri: String,
    expected: String,
    actual: String,
  },

  #[error("archive entry escapes the target directory: {}", .path.display())]
  UnsafeArchivePath { path: PathBuf },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
