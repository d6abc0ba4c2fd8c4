//! Implementation of the `gotip-buildpack build` command.
//!
//! Follows the buildpack build contract: the layers directory, platform
//! directory and plan file are positional, the buildpack directory and stack
//! come from the lifecycle environment, and the application source is the
//! current directory.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use gotip_lib::build::Build;
use gotip_lib::buildpack::BuildpackToml;
use gotip_lib::consts::{BUILDPACK_TOML, GO_EXECUTABLE, GOTIP_EXECUTABLE};
use gotip_lib::context::BuildContext;
use gotip_lib::dependency::Service;
use gotip_lib::env::Environment;
use gotip_lib::exec::ProcessExecutable;
use gotip_lib::layers::Layers;
use gotip_lib::logs::{Emitter, format_duration};
use gotip_lib::plan::{BuildpackPlan, Planner};

use crate::output::{format_layer_flags, print_stat, print_success};

/// Execute the build command.
///
/// Runs the build, then writes `<layer>.toml` for every layer it returns so
/// the lifecycle picks up their flags.
pub fn cmd_build(layers: &Path, platform: &Path, plan: &Path, buildpack_dir: &Path, stack: String) -> Result<()> {
  let buildpack = BuildpackToml::load(&buildpack_dir.join(BUILDPACK_TOML)).context("Failed to load buildpack.toml")?;
  let plan = BuildpackPlan::load(plan).context("Failed to load build plan")?;
  let working_dir = std::env::current_dir().context("Failed to determine working directory")?;

  let context = BuildContext {
    buildpack_info: buildpack.buildpack,
    cnb_path: buildpack_dir.to_path_buf(),
    stack,
    working_dir,
    platform_path: platform.to_path_buf(),
    plan,
    layers: Layers::new(layers),
    environment: Environment::from_process(),
  };

  let build = Build::new(
    Planner::new(),
    Service::new(),
    ProcessExecutable::new(GO_EXECUTABLE),
    ProcessExecutable::new(GOTIP_EXECUTABLE),
    Emitter::stdout(),
  );

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let result = rt.block_on(build.run(&context)).context("Build failed")?;

  for layer in &result.layers {
    layer
      .write_metadata()
      .with_context(|| format!("Failed to write metadata for layer {}", layer.name))?;
    info!(layer = %layer.name, path = ?layer.metadata_path(), "layer metadata written");
  }

  print_success("Build complete");
  for layer in &result.layers {
    print_stat(
      &format!("Layer {}", layer.name),
      &format_layer_flags(layer.launch, layer.build, layer.cache),
    );
  }
  for record in &result.executions {
    print_stat(&record.command_line(), &format_duration(record.duration));
  }

  Ok(())
}
