//! Subprocess execution.
//!
//! The build only ever runs two commands, `go install` and `gotip download`.
//! Both go through the [`Executable`] capability so the orchestrator can be
//! driven by test doubles.
//!
//! [`ProcessExecutable`] is the real implementation. Unlike a login shell it
//! never inherits the parent environment: the child sees exactly the
//! [`Environment`](crate::env::Environment) of the [`Execution`].

mod types;

pub use types::*;

use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

/// Something that can run an [`Execution`].
#[allow(async_fn_in_trait)]
pub trait Executable {
  /// Name used in logs and error messages.
  fn name(&self) -> &str;

  /// Run to completion, appending combined stdout and stderr to `output`.
  async fn execute(&self, execution: &Execution, output: &mut Vec<u8>) -> Result<(), ExecError>;
}

/// Runs a named binary found on the execution's `PATH`.
#[derive(Debug, Clone)]
pub struct ProcessExecutable {
  name: String,
}

impl ProcessExecutable {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into() }
  }

  /// Resolve the binary against the execution environment rather than ours.
  ///
  /// `gotip` only exists on the `PATH` built for the download stage, so the
  /// lookup cannot use the parent process `PATH`.
  fn locate(&self, execution: &Execution) -> PathBuf {
    which::which_in(&self.name, execution.env.get("PATH"), &execution.dir).unwrap_or_else(|_| PathBuf::from(&self.name))
  }
}

impl Executable for ProcessExecutable {
  fn name(&self) -> &str {
    &self.name
  }

  async fn execute(&self, execution: &Execution, output: &mut Vec<u8>) -> Result<(), ExecError> {
    let program = self.locate(execution);
    info!(cmd = %self.name, args = ?execution.args, "executing command");
    debug!(program = ?program, working_dir = ?execution.dir, "spawning process");

    let result = Command::new(&program)
      .args(&execution.args)
      .current_dir(&execution.dir)
      .env_clear()
      .envs(execution.env.pairs().filter(|(key, _)| !key.is_empty()))
      .stdin(Stdio::null())
      .output()
      .await
      .map_err(|source| ExecError::Spawn {
        program: program.display().to_string(),
        source,
      })?;

    output.extend_from_slice(&result.stdout);
    output.extend_from_slice(&result.stderr);

    if !result.status.success() {
      debug!(cmd = %self.name, code = ?result.status.code(), "command failed");
      return Err(ExecError::Failed {
        cmd: self.name.clone(),
        code: result.status.code(),
      });
    }

    Ok(())
  }
}
