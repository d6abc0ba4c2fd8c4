//! Types for build execution.

use tempfile::TempDir;
use thiserror::Error;

use super::Stage;
use crate::dependency::{Dependency, DependencyError};
use crate::env::Environment;
use crate::exec::{ExecError, ExecutionRecord};
use crate::layers::{Layer, LayerError};

/// Errors a single stage can fail with.
#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Layer(#[from] LayerError),

  #[error(transparent)]
  Dependency(#[from] DependencyError),

  /// A subprocess failed. Its output went to the build log.
  #[error("failed to execute '{command}': {source}")]
  Exec {
    command: String,
    #[source]
    source: ExecError,
  },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// A stage ran before the stage that produces its input.
  #[error("missing build state: {0}")]
  MissingState(&'static str),
}

/// A build failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct BuildError {
  pub stage: Stage,
  #[source]
  pub source: StageError,
}

/// Accumulated state threaded through the stages.
///
/// The temporary directories are guards: dropping the state removes them.
#[derive(Debug, Default)]
pub struct BuildState {
  pub scratch_layer: Option<Layer>,
  pub dependency: Option<Dependency>,
  pub gopath: Option<TempDir>,
  pub install_env: Option<Environment>,
  pub home: Option<TempDir>,
  pub toolchain_layer: Option<Layer>,
  pub executions: Vec<ExecutionRecord>,
}

impl BuildState {
  pub fn scratch_layer(&self) -> Result<&Layer, StageError> {
    self.scratch_layer.as_ref().ok_or(StageError::MissingState("scratch layer"))
  }

  pub fn dependency(&self) -> Result<&Dependency, StageError> {
    self.dependency.as_ref().ok_or(StageError::MissingState("dependency"))
  }

  pub fn gopath(&self) -> Result<&TempDir, StageError> {
    self.gopath.as_ref().ok_or(StageError::MissingState("GOPATH"))
  }

  pub fn install_env(&self) -> Result<&Environment, StageError> {
    self.install_env.as_ref().ok_or(StageError::MissingState("install environment"))
  }

  pub fn home(&self) -> Result<&TempDir, StageError> {
    self.home.as_ref().ok_or(StageError::MissingState("HOME"))
  }
}
