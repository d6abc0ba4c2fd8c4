//! Types for subprocess execution.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::env::Environment;

/// Errors that can occur while running a subprocess.
#[derive(Debug, Error)]
pub enum ExecError {
  /// The process could not be started.
  #[error("failed to spawn {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The process ran and exited unsuccessfully.
  #[error("{cmd} exited with code {code:?}")]
  Failed { cmd: String, code: Option<i32> },
}

/// One invocation request: arguments, working directory and environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
  pub args: Vec<String>,
  pub dir: PathBuf,
  pub env: Environment,
}

impl Execution {
  pub fn new(args: Vec<String>, dir: impl Into<PathBuf>, env: Environment) -> Self {
    Self {
      args,
      dir: dir.into(),
      env,
    }
  }
}

/// What happened when a command ran, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
  /// Name of the executable (e.g. `go`).
  pub command: String,
  pub execution: Execution,
  /// Combined stdout and stderr.
  pub output: String,
  pub duration: Duration,
  /// Failure message, `None` when the command succeeded.
  pub error: Option<String>,
}

impl ExecutionRecord {
  pub fn succeeded(&self) -> bool {
    self.error.is_none()
  }

  /// The command line as it would be typed, e.g. `gotip download`.
  pub fn command_line(&self) -> String {
    std::iter::once(self.command.as_str())
      .chain(self.execution.args.iter().map(String::as_str))
      .collect::<Vec<_>>()
      .join(" ")
  }
}
