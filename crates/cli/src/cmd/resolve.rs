//! Resolve command implementation.
//!
//! Prints the `go` dependency a build would deliver, without fetching it.

use std::path::Path;

use anyhow::{Context, Result};

use gotip_lib::consts::{BUILDPACK_TOML, GO_DEPENDENCY_ID};
use gotip_lib::dependency::{DependencyManager, Service};

use crate::output::{OutputFormat, print_json, print_stat, print_success};

pub fn cmd_resolve(buildpack_dir: &Path, version: &str, stack: &str, format: OutputFormat) -> Result<()> {
  let dependency = Service::new()
    .resolve(&buildpack_dir.join(BUILDPACK_TOML), GO_DEPENDENCY_ID, version, stack)
    .with_context(|| format!("Failed to resolve {} {}", GO_DEPENDENCY_ID, version))?;

  if format.is_json() {
    print_json(&dependency)?;
    return Ok(());
  }

  print_success(&format!("Go {}", dependency.version));
  print_stat("URI", &dependency.uri);
  if let Some(checksum) = dependency.checksum.as_deref().or(dependency.sha256.as_deref()) {
    print_stat("Checksum", checksum);
  }
  print_stat("Stacks", &dependency.stacks.join(", "));
  if let Some(date) = &dependency.deprecation_date {
    print_stat("Deprecated", date);
  }

  Ok(())
}
