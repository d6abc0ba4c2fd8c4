//! Build orchestration.
//!
//! A build installs the Go tip toolchain into the `go` layer. It bootstraps
//! through a released toolchain:
//!
//! 1. Resolve and deliver the default `go` dependency into the scratch layer
//! 2. `go install golang.org/dl/gotip@latest` with a temporary `GOPATH`
//! 3. `gotip download` with a temporary `HOME`
//! 4. Move `<HOME>/sdk/gotip` into the `go` layer
//!
//! Each step is a [`Stage`]. Stages run strictly in order and the first
//! failure ends the build with a [`BuildError`] naming the stage.
//!
//! # Submodules
//!
//! - [`stage`] - The ordered stage list
//! - `types` - Errors and the state threaded between stages

pub mod stage;
mod types;

pub use stage::Stage;
pub use types::*;

use std::path::Path;
use std::time::Instant;

use tempfile::TempDir;
use tracing::{debug, error, info, warn};

use crate::consts::{
  BUILDPACK_TOML, DEFAULT_VERSION, GO_DEPENDENCY_ID, GO_PLAN_NAME, GOTIP_MODULE, GOTIP_SDK_SUBPATH,
  SCRATCH_LAYER_NAME, TEMP_GOPATH_PREFIX, TEMP_HOME_PREFIX, TOOLCHAIN_LAYER_NAME,
};
use crate::context::{BuildContext, BuildResult};
use crate::dependency::DependencyManager;
use crate::exec::{Executable, Execution, ExecutionRecord};
use crate::logs::{Emitter, format_duration};
use crate::plan::EntryResolver;
use crate::util::fs::{make_tree_writable, move_path, visible_entries};

/// The gotip build, parameterized over its capabilities.
pub struct Build<R, D, G, T> {
  entry_resolver: R,
  dependency_manager: D,
  go: G,
  gotip: T,
  emitter: Emitter,
}

impl<R, D, G, T> Build<R, D, G, T>
where
  R: EntryResolver,
  D: DependencyManager,
  G: Executable,
  T: Executable,
{
  pub fn new(entry_resolver: R, dependency_manager: D, go: G, gotip: T, emitter: Emitter) -> Self {
    Self {
      entry_resolver,
      dependency_manager,
      go,
      gotip,
      emitter,
    }
  }

  /// Run every stage against `context`.
  ///
  /// Temporary directories are removed before returning, whatever the outcome.
  pub async fn run(&self, context: &BuildContext) -> Result<BuildResult, BuildError> {
    let started = Instant::now();
    let mut state = BuildState::default();

    let outcome = self.run_stages(context, &mut state).await;
    release_temp_dir(state.home.take());
    release_temp_dir(state.gopath.take());
    outcome?;

    let layer = state.toolchain_layer.take().ok_or(BuildError {
      stage: Stage::RelocateSdk,
      source: StageError::MissingState("toolchain layer"),
    })?;

    info!(
      layer = %layer.name,
      launch = layer.launch,
      build = layer.build,
      cache = layer.cache,
      duration = ?started.elapsed(),
      "build complete"
    );

    Ok(BuildResult {
      layers: vec![layer],
      executions: state.executions,
    })
  }

  async fn run_stages(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), BuildError> {
    for stage in Stage::ALL {
      debug!(stage = %stage, "running stage");
      if let Err(source) = self.run_stage(stage, context, state).await {
        error!(stage = %stage, error = %source, "stage failed");
        return Err(BuildError { stage, source });
      }
    }
    Ok(())
  }

  async fn run_stage(&self, stage: Stage, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    match stage {
      Stage::Init => self.init(context, state),
      Stage::ResolveBase => self.resolve_base(context, state),
      Stage::InstallBase => self.install_base(context, state).await,
      Stage::InstallVersionManager => self.install_version_manager(context, state).await,
      Stage::RunVersionManagerDownload => self.run_version_manager_download(context, state).await,
      Stage::PreparePersistentLayer => self.prepare_persistent_layer(context, state),
      Stage::RelocateSdk => relocate_sdk(state),
    }
  }

  fn init(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    let info = &context.buildpack_info;
    self.emitter.title(format!("{} {}", info.name, info.version));

    let layer = context.layers.get(SCRATCH_LAYER_NAME)?.reset()?;
    state.scratch_layer = Some(layer);
    Ok(())
  }

  fn resolve_base(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    let dependency = self.dependency_manager.resolve(
      &context.cnb_path.join(BUILDPACK_TOML),
      GO_DEPENDENCY_ID,
      DEFAULT_VERSION,
      &context.stack,
    )?;
    info!(id = %dependency.id, version = %dependency.version, stack = %context.stack, "resolved base toolchain");

    self.emitter.process("Executing build process");
    state.dependency = Some(dependency);
    Ok(())
  }

  async fn install_base(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    let dependency = state.dependency()?;
    let scratch = state.scratch_layer()?;

    self.emitter.subprocess(format!("Installing Go {}", dependency.version));
    let started = Instant::now();
    self
      .dependency_manager
      .deliver(dependency, &context.cnb_path, &scratch.path, &context.platform_path)
      .await?;
    self.emitter.action(format!("Completed in {}", format_duration(started.elapsed())));
    self.emitter.break_line();

    if let Some(layer) = state.scratch_layer.as_mut() {
      layer.mark_populated();
    }
    Ok(())
  }

  async fn install_version_manager(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    let scratch_path = state.scratch_layer()?.path.clone();
    let gopath = temp_dir_in(&scratch_path, TEMP_GOPATH_PREFIX)?;

    let env = context
      .environment
      .with_path_prepended(&scratch_path.join("bin"))
      .with("GOPATH", gopath.path().to_string_lossy());
    let execution = Execution::new(
      vec!["install".to_string(), GOTIP_MODULE.to_string()],
      &context.working_dir,
      env.clone(),
    );
    state.gopath = Some(gopath);
    state.install_env = Some(env);

    self.emitter.process("Installing gotip");
    run_command(&self.emitter, &self.go, execution, &mut state.executions).await
  }

  async fn run_version_manager_download(
    &self,
    context: &BuildContext,
    state: &mut BuildState,
  ) -> Result<(), StageError> {
    let scratch_path = state.scratch_layer()?.path.clone();
    let home = temp_dir_in(&scratch_path, TEMP_HOME_PREFIX)?;

    let env = state
      .install_env()?
      .with_path_prepended(&state.gopath()?.path().join("bin"))
      .with("HOME", home.path().to_string_lossy());
    let execution = Execution::new(vec!["download".to_string()], &context.working_dir, env);
    state.home = Some(home);

    self.emitter.process("Running gotip");
    run_command(&self.emitter, &self.gotip, execution, &mut state.executions).await
  }

  fn prepare_persistent_layer(&self, context: &BuildContext, state: &mut BuildState) -> Result<(), StageError> {
    let mut layer = context.layers.get(TOOLCHAIN_LAYER_NAME)?.reset()?;

    let (launch, build) = self
      .entry_resolver
      .merge_layer_types(GO_PLAN_NAME, &context.plan.entries);
    layer.launch = launch;
    layer.build = build;
    layer.cache = build;
    debug!(layer = %layer.name, launch, build, cache = build, "layer flags set");

    state.toolchain_layer = Some(layer);
    Ok(())
  }
}

fn relocate_sdk(state: &mut BuildState) -> Result<(), StageError> {
  let sdk = GOTIP_SDK_SUBPATH
    .iter()
    .fold(state.home()?.path().to_path_buf(), |path, part| path.join(part));
  let layer = state
    .toolchain_layer
    .as_mut()
    .ok_or(StageError::MissingState("toolchain layer"))?;

  for entry in visible_entries(&sdk)? {
    let Some(name) = entry.file_name() else {
      continue;
    };
    let destination = layer.path.join(name);
    debug!(from = ?entry, to = ?destination, "moving sdk entry");
    move_path(&entry, &destination)?;
  }

  layer.mark_populated();
  info!(sdk = ?sdk, layer = ?layer.path, "sdk relocated");
  Ok(())
}

/// Run one command, logging its outcome and keeping a record of it.
///
/// Captured output reaches the build log only when the command fails.
async fn run_command<E: Executable>(
  emitter: &Emitter,
  executable: &E,
  execution: Execution,
  records: &mut Vec<ExecutionRecord>,
) -> Result<(), StageError> {
  let mut record = ExecutionRecord {
    command: executable.name().to_string(),
    execution,
    output: String::new(),
    duration: Default::default(),
    error: None,
  };
  emitter.subprocess(format!("Running {}", record.command_line()));

  let mut output = Vec::new();
  let started = Instant::now();
  let result = executable.execute(&record.execution, &mut output).await;
  record.duration = started.elapsed();
  record.output = String::from_utf8_lossy(&output).into_owned();

  let outcome = match result {
    Ok(()) => {
      emitter.action(format!("Completed in {}", format_duration(record.duration)));
      emitter.break_line();
      Ok(())
    }
    Err(source) => {
      emitter.action(format!("Failed after {}", format_duration(record.duration)));
      emitter.detail(&record.output);
      record.error = Some(source.to_string());

      let subcommand = record.execution.args.first().map(String::as_str).unwrap_or_default();
      Err(StageError::Exec {
        command: format!("{} {}", record.command, subcommand),
        source,
      })
    }
  };

  debug!(cmd = %record.command_line(), duration = ?record.duration, ok = outcome.is_ok(), "command finished");
  records.push(record);
  outcome
}

fn temp_dir_in(parent: &Path, prefix: &str) -> std::io::Result<TempDir> {
  tempfile::Builder::new().prefix(prefix).tempdir_in(parent)
}

fn release_temp_dir(dir: Option<TempDir>) {
  let Some(dir) = dir else {
    return;
  };
  let path = dir.path().to_path_buf();

  if let Err(e) = make_tree_writable(&path) {
    warn!(path = ?path, error = %e, "failed to make temporary directory writable");
  }
  match dir.close() {
    Ok(()) => debug!(path = ?path, "removed temporary directory"),
    Err(e) => warn!(path = ?path, error = %e, "failed to remove temporary directory"),
  }
}
