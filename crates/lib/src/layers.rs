//! Directory-backed layer store.
//!
//! # Layout
//!
//! ```text
//! <layers>/
//! ├── go/            # layer contents
//! ├── go.toml        # flags and metadata
//! └── temp-go/       # scratch layer, no toml
//! ```
//!
//! `<name>.toml` uses the buildpack API format:
//!
//! ```toml
//! [types]
//! launch = true
//! build = false
//! cache = false
//!
//! [metadata]
//! ```

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LayerError {
  #[error("failed to read layer metadata {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse layer metadata {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to reset layer {path}: {source}")]
  Reset {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to serialize layer metadata: {0}")]
  Serialize(#[from] toml::ser::Error),

  #[error("failed to write layer metadata {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Where a layer is in its lifecycle during this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerState {
  /// Handed out by [`Layers::get`], possibly holding a previous build's files.
  Restored,
  /// Emptied by [`Layer::reset`].
  Fresh,
  /// Written by this build.
  Populated,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerTypes {
  #[serde(default)]
  launch: bool,
  #[serde(default)]
  build: bool,
  #[serde(default)]
  cache: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LayerToml {
  #[serde(default)]
  types: LayerTypes,
  #[serde(default, skip_serializing_if = "toml::Table::is_empty")]
  metadata: toml::Table,
}

/// A named directory with visibility flags.
#[derive(Debug, Clone)]
pub struct Layer {
  pub name: String,
  pub path: PathBuf,
  /// Visible to the running application.
  pub launch: bool,
  /// Visible to later build steps.
  pub build: bool,
  /// Kept across builds.
  pub cache: bool,
  pub metadata: toml::Table,
  pub state: LayerState,
}

impl Layer {
  /// `<layers>/<name>.toml`
  pub fn metadata_path(&self) -> PathBuf {
    let mut path = OsString::from(self.path.as_os_str());
    path.push(".toml");
    PathBuf::from(path)
  }

  /// Empty the layer and clear its flags.
  ///
  /// Afterwards the directory exists and has no entries.
  pub fn reset(mut self) -> Result<Layer, LayerError> {
    let reset_failed = |source: io::Error| LayerError::Reset {
      path: self.path.clone(),
      source,
    };

    match std::fs::remove_dir_all(&self.path) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(reset_failed(e)),
    }
    std::fs::create_dir_all(&self.path).map_err(reset_failed)?;

    match std::fs::remove_file(self.metadata_path()) {
      Ok(()) => {}
      Err(e) if e.kind() == io::ErrorKind::NotFound => {}
      Err(e) => return Err(reset_failed(e)),
    }

    debug!(layer = %self.name, path = ?self.path, "layer reset");

    self.launch = false;
    self.build = false;
    self.cache = false;
    self.metadata = toml::Table::new();
    self.state = LayerState::Fresh;
    Ok(self)
  }

  pub fn mark_populated(&mut self) {
    self.state = LayerState::Populated;
  }

  /// Persist flags and metadata to `<name>.toml`.
  pub fn write_metadata(&self) -> Result<(), LayerError> {
    let content = toml::to_string(&LayerToml {
      types: LayerTypes {
        launch: self.launch,
        build: self.build,
        cache: self.cache,
      },
      metadata: self.metadata.clone(),
    })?;

    let path = self.metadata_path();
    std::fs::write(&path, content).map_err(|source| LayerError::Write { path, source })
  }
}

/// The layers directory handed to the build.
#[derive(Debug, Clone)]
pub struct Layers {
  pub path: PathBuf,
}

impl Layers {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Look up a layer, restoring flags from a previous build when present.
  pub fn get(&self, name: &str) -> Result<Layer, LayerError> {
    let mut layer = Layer {
      name: name.to_string(),
      path: self.path.join(name),
      launch: false,
      build: false,
      cache: false,
      metadata: toml::Table::new(),
      state: LayerState::Restored,
    };

    let metadata_path = layer.metadata_path();
    if let Some(existing) = read_layer_toml(&metadata_path)? {
      layer.launch = existing.types.launch;
      layer.build = existing.types.build;
      layer.cache = existing.types.cache;
      layer.metadata = existing.metadata;
    }

    Ok(layer)
  }
}

fn read_layer_toml(path: &Path) -> Result<Option<LayerToml>, LayerError> {
  let content = match std::fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(LayerError::Read {
        path: path.to_path_buf(),
        source,
      });
    }
  };

  toml::from_str(&content).map(Some).map_err(|source| LayerError::Parse {
    path: path.to_path_buf(),
    source,
  })
}
