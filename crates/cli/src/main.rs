mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gotip_lib::consts::DEFAULT_VERSION;

use crate::output::{OutputFormat, print_error};

/// gotip-buildpack - Installs the Go tip toolchain into a buildpack layer
#[derive(Parser)]
#[command(name = "gotip-buildpack")]
#[command(author, version, about, long_about = None)]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the build phase
  Build {
    /// Layers directory
    layers: PathBuf,

    /// Platform directory
    platform: PathBuf,

    /// Buildpack plan file
    plan: PathBuf,

    /// Buildpack install directory
    #[arg(long, env = "CNB_BUILDPACK_DIR")]
    buildpack_dir: PathBuf,

    /// Stack the build runs on
    #[arg(long, env = "CNB_STACK_ID")]
    stack: String,
  },

  /// Show the Go toolchain a build bootstraps from
  Resolve {
    /// Version constraint
    #[arg(long, default_value = DEFAULT_VERSION)]
    version: String,

    /// Buildpack install directory
    #[arg(long, env = "CNB_BUILDPACK_DIR")]
    buildpack_dir: PathBuf,

    /// Stack the build runs on
    #[arg(long, env = "CNB_STACK_ID")]
    stack: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
  },
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Build {
      layers,
      platform,
      plan,
      buildpack_dir,
      stack,
    } => cmd::cmd_build(&layers, &platform, &plan, &buildpack_dir, stack),
    Commands::Resolve {
      version,
      buildpack_dir,
      stack,
      format,
    } => cmd::cmd_resolve(&buildpack_dir, &version, &stack, format),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&e.to_string());
      // Library errors already carry their own causes in their message.
      if let Some(cause) = e.chain().nth(1) {
        eprintln!("  {}", cause);
      }
      ExitCode::FAILURE
    }
  }
}
