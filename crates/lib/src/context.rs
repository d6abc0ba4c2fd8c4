//! Inputs and outputs of a single build invocation.

use std::path::PathBuf;

use crate::buildpack::BuildpackInfo;
use crate::env::Environment;
use crate::exec::ExecutionRecord;
use crate::layers::{Layer, Layers};
use crate::plan::BuildpackPlan;

/// Everything the platform hands to a build.
#[derive(Debug, Clone)]
pub struct BuildContext {
  pub buildpack_info: BuildpackInfo,
  /// The buildpack's own install directory.
  pub cnb_path: PathBuf,
  pub stack: String,
  /// Application source directory; commands run here.
  pub working_dir: PathBuf,
  pub platform_path: PathBuf,
  pub plan: BuildpackPlan,
  pub layers: Layers,
  /// Base environment every stage derives its own from.
  pub environment: Environment,
}

/// What a successful build exposes.
#[derive(Debug, Clone)]
pub struct BuildResult {
  pub layers: Vec<Layer>,
  /// One record per command run, in order.
  pub executions: Vec<ExecutionRecord>,
}
