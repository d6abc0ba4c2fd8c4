//! Toolchain dependency resolution and delivery.
//!
//! The build installs the base Go toolchain through the [`DependencyManager`]
//! capability. [`Service`] implements it on top of the buildpack's own
//! `buildpack.toml`:
//!
//! - [`resolve`](DependencyManager::resolve) picks a [`Dependency`] for an id,
//!   version constraint and stack (see [`resolve`] for the algorithm)
//! - [`deliver`](DependencyManager::deliver) fetches it, verifies its sha256
//!   and unpacks it into a layer (see [`deliver`])

pub mod deliver;
pub mod resolve;
mod types;

pub use types::*;

use std::path::Path;

use crate::buildpack::BuildpackToml;
use deliver::deliver_dependency;
use resolve::resolve_dependency;

/// Resolves and installs versioned dependencies.
#[allow(async_fn_in_trait)]
pub trait DependencyManager {
  /// Resolve `id` at `version` for `stack` from the metadata file at `path`.
  fn resolve(&self, path: &Path, id: &str, version: &str, stack: &str) -> Result<Dependency, DependencyError>;

  /// Install `dependency` into `layer_path`.
  async fn deliver(
    &self,
    dependency: &Dependency,
    cnb_path: &Path,
    layer_path: &Path,
    platform_path: &Path,
  ) -> Result<(), DependencyError>;
}

/// `buildpack.toml`-backed dependency manager.
#[derive(Debug, Clone, Default)]
pub struct Service {
  client: reqwest::Client,
}

impl Service {
  pub fn new() -> Self {
    Self::default()
  }
}

impl DependencyManager for Service {
  fn resolve(&self, path: &Path, id: &str, version: &str, stack: &str) -> Result<Dependency, DependencyError> {
    let buildpack = BuildpackToml::load(path)?;
    resolve_dependency(&buildpack, id, version, stack)
  }

  async fn deliver(
    &self,
    dependency: &Dependency,
    cnb_path: &Path,
    layer_path: &Path,
    platform_path: &Path,
  ) -> Result<(), DependencyError> {
    deliver_dependency(&self.client, dependency, cnb_path, layer_path, platform_path).await
  }
}
