//! Process environment overlays.
//!
//! An [`Environment`] is an ordered list of `KEY=VALUE` entries. Every
//! override produces a new value, so each build stage can derive its own
//! environment from the previous one without disturbing it.

use std::path::Path;

#[cfg(windows)]
const PATH_SEPARATOR: char = ';';

#[cfg(not(windows))]
const PATH_SEPARATOR: char = ':';

/// Override `key` in place when present, otherwise append `KEY=VALUE`.
///
/// The key of an entry is everything before its first `=`, so values that
/// contain `=` never confuse the match. An entry without any `=` is treated
/// as a key with no value.
pub fn set_or_override(mut env: Vec<String>, key: &str, value: &str) -> Vec<String> {
  let entry = format!("{}={}", key, value);

  match env.iter().position(|e| entry_key(e) == key) {
    Some(index) => env[index] = entry,
    None => env.push(entry),
  }

  env
}

fn entry_key(entry: &str) -> &str {
  entry.split_once('=').map(|(key, _)| key).unwrap_or(entry)
}

/// An ordered, copy-on-write process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
  entries: Vec<String>,
}

impl Environment {
  pub fn new(entries: Vec<String>) -> Self {
    Self { entries }
  }

  /// Snapshot the environment of the current process.
  pub fn from_process() -> Self {
    let entries = std::env::vars_os()
      .map(|(key, value)| format!("{}={}", key.to_string_lossy(), value.to_string_lossy()))
      .collect();
    Self { entries }
  }

  /// Return a new environment with `key` set to `value`.
  pub fn with(&self, key: &str, value: impl AsRef<str>) -> Self {
    Self {
      entries: set_or_override(self.entries.clone(), key, value.as_ref()),
    }
  }

  /// Return a new environment whose `PATH` starts with `dir`.
  ///
  /// An unset or empty `PATH` becomes just `dir`.
  pub fn with_path_prepended(&self, dir: &Path) -> Self {
    let dir = dir.to_string_lossy();
    let path = match self.get("PATH") {
      Some(existing) if !existing.is_empty() => format!("{}{}{}", dir, PATH_SEPARATOR, existing),
      _ => dir.into_owned(),
    };
    self.with("PATH", path)
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|e| entry_key(e) == key)
      .map(|e| e.split_once('=').map(|(_, value)| value).unwrap_or(""))
  }

  pub fn entries(&self) -> &[String] {
    &self.entries
  }

  /// Iterate `(key, value)` pairs in order.
  pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|e| e.split_once('=').unwrap_or((e.as_str(), "")))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl From<Vec<String>> for Environment {
  fn from(entries: Vec<String>) -> Self {
    Self::new(entries)
  }
}
