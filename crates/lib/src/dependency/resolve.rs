//! Dependency resolution against `buildpack.toml` metadata.
//!
//! # Resolution Algorithm
//!
//! 1. `default` is replaced by the `default-versions` entry for the id (`*`
//!    when there is none)
//! 2. Candidates must match the id and list the stack (or `*`)
//! 3. Candidates must satisfy the constraint
//! 4. The highest version wins
//!
//! Constraints follow the buildpack ecosystem's conventions rather than
//! Cargo's: a bare `1.19.3` (or `1.20.0-rc1`) means exactly that version and
//! `1.19` means any `1.19.x`. Everything else (`1.19.*`, `~1.19`, `>=1.18, <1.20`) is a
//! `semver` requirement, and `||` separates alternatives.

use semver::{Version, VersionReq};
use tracing::debug;

use super::types::{Dependency, DependencyError};
use crate::buildpack::BuildpackToml;
use crate::consts::DEFAULT_VERSION;

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
  Exact(Version),
  AnyOf(Vec<VersionReq>),
}

impl Constraint {
  pub fn parse(raw: &str) -> Result<Self, DependencyError> {
    let invalid = |source: semver::Error| DependencyError::InvalidConstraint {
      constraint: raw.to_string(),
      source,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "*" {
      return Ok(Constraint::AnyOf(vec![VersionReq::STAR]));
    }

    let core = trimmed.trim_start_matches('v');
    let (numeric, suffix) = match core.find(['-', '+']) {
      Some(index) => core.split_at(index),
      None => (core, ""),
    };
    if is_bare_version(numeric) {
      // A prerelease or build suffix always pins one version.
      if numeric.split('.').count() == 3 || !suffix.is_empty() {
        return parse_version(core).map(Constraint::Exact).map_err(invalid);
      }
      return VersionReq::parse(&format!("={}", core))
        .map(|req| Constraint::AnyOf(vec![req]))
        .map_err(invalid);
    }

    trimmed
      .split("||")
      .map(|alternative| VersionReq::parse(alternative.trim()))
      .collect::<Result<Vec<_>, _>>()
      .map(Constraint::AnyOf)
      .map_err(invalid)
  }

  pub fn matches(&self, version: &Version) -> bool {
    match self {
      Constraint::Exact(exact) => exact == version,
      Constraint::AnyOf(reqs) => reqs.iter().any(|req| req.matches(version)),
    }
  }
}

fn is_bare_version(core: &str) -> bool {
  !core.is_empty() && core.split('.').all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Parse a version, padding a missing minor or patch component with zeros.
pub fn parse_version(raw: &str) -> Result<Version, semver::Error> {
  let raw = raw.trim().trim_start_matches('v');
  let (core, rest) = match raw.find(['-', '+']) {
    Some(index) => raw.split_at(index),
    None => (raw, ""),
  };

  let mut padded = core.to_string();
  for _ in core.split('.').count()..3 {
    padded.push_str(".0");
  }
  padded.push_str(rest);

  Version::parse(&padded)
}

/// Pick the dependency a build should install.
pub fn resolve_dependency(
  buildpack: &BuildpackToml,
  id: &str,
  version: &str,
  stack: &str,
) -> Result<Dependency, DependencyError> {
  let constraint_str = if version == DEFAULT_VERSION {
    buildpack
      .metadata
      .default_versions
      .get(id)
      .map(String::as_str)
      .unwrap_or("*")
  } else {
    version
  };
  let constraint = Constraint::parse(constraint_str)?;

  let mut supported = Vec::new();
  let mut best: Option<(Version, &Dependency)> = None;

  for dependency in &buildpack.metadata.dependencies {
    if dependency.id != id || !dependency.supports_stack(stack) {
      continue;
    }

    let parsed = parse_version(&dependency.version).map_err(|source| DependencyError::InvalidVersion {
      id: dependency.id.clone(),
      version: dependency.version.clone(),
      source,
    })?;
    supported.push(dependency.version.clone());

    if !constraint.matches(&parsed) {
      continue;
    }

    if best.as_ref().is_none_or(|(current, _)| parsed > *current) {
      best = Some((parsed, dependency));
    }
  }

  match best {
    Some((_, dependency)) => {
      debug!(id = %id, constraint = %constraint_str, version = %dependency.version, "resolved dependency");
      Ok(dependency.clone())
    }
    None => Err(DependencyError::NoCompatibleVersion {
      id: id.to_string(),
      constraint: constraint_str.to_string(),
      stack: stack.to_string(),
      supported,
    }),
  }
}
