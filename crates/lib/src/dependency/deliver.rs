//! Dependency delivery: fetch, verify, extract.
//!
//! The archive is held in memory, checked against the dependency's sha256,
//! and only then unpacked into the target layer. A mismatch never touches the
//! layer.

use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

use super::types::{Dependency, DependencyError};

/// Binding type that maps dependency checksums to alternative uris.
pub const DEPENDENCY_MAPPING_BINDING: &str = "dependency-mapping";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Fetch, verify and extract `dependency` into `layer_path`.
pub async fn deliver_dependency(
  client: &reqwest::Client,
  dependency: &Dependency,
  cnb_path: &Path,
  layer_path: &Path,
  platform_path: &Path,
) -> Result<(), DependencyError> {
  let expected = match dependency.sha256_hex() {
    Ok(Some(hex)) => hex.to_lowercase(),
    Ok(None) => {
      return Err(DependencyError::MissingChecksum {
        id: dependency.id.clone(),
      });
    }
    Err(checksum) => {
      return Err(DependencyError::UnsupportedChecksum {
        id: dependency.id.clone(),
        checksum: checksum.to_string(),
      });
    }
  };

  let uri = match mapped_uri(platform_path, &expected).await? {
    Some(mapped) => {
      debug!(id = %dependency.id, uri = %mapped, "dependency uri overridden by binding");
      mapped
    }
    None => dependency.uri.clone(),
  };

  info!(id = %dependency.id, version = %dependency.version, uri = %uri, "delivering dependency");

  let bytes = fetch(client, &uri, cnb_path).await?;

  let actual = hex::encode(Sha256::digest(&bytes));
  if actual != expected {
    return Err(DependencyError::ChecksumMismatch {
      uri,
      expected,
      actual,
    });
  }

  fs::create_dir_all(layer_path).await?;
  extract(&bytes, layer_path, dependency.strip_components)?;

  info!(path = ?layer_path, size = bytes.len(), "dependency delivered");
  Ok(())
}

/// Look for a `dependency-mapping` binding entry named after `sha256`.
///
/// Bindings live under `<platform>/bindings/<name>/`, each with a `type` file.
async fn mapped_uri(platform_path: &Path, sha256: &str) -> Result<Option<String>, DependencyError> {
  let bindings = platform_path.join("bindings");
  if !bindings.is_dir() {
    return Ok(None);
  }

  let mut entries = fs::read_dir(&bindings).await?;
  while let Some(entry) = entries.next_entry().await? {
    let binding = entry.path();
    let Ok(kind) = fs::read_to_string(binding.join("type")).await else {
      continue;
    };
    if kind.trim() != DEPENDENCY_MAPPING_BINDING {
      continue;
    }

    let mapping = binding.join(sha256);
    if mapping.is_file() {
      let uri = fs::read_to_string(&mapping).await?;
      return Ok(Some(uri.trim().to_string()));
    }
  }

  Ok(None)
}

async fn fetch(client: &reqwest::Client, uri: &str, cnb_path: &Path) -> Result<Vec<u8>, DependencyError> {
  let fetch_failed = |message: String| DependencyError::Fetch {
    uri: uri.to_string(),
    message,
  };

  if uri.starts_with("http://") || uri.starts_with("https://") {
    let response = client.get(uri).send().await.map_err(|e| fetch_failed(e.to_string()))?;

    if !response.status().is_success() {
      return Err(fetch_failed(format!("HTTP {}", response.status())));
    }

    let bytes = response.bytes().await.map_err(|e| fetch_failed(e.to_string()))?;
    return Ok(bytes.to_vec());
  }

  let path = match uri.strip_prefix("file://") {
    Some(path) => PathBuf::from(path),
    None if uri.contains("://") => return Err(DependencyError::UnsupportedUri(uri.to_string())),
    None => PathBuf::from(uri),
  };
  let path = if path.is_relative() { cnb_path.join(path) } else { path };

  debug!(path = ?path, "reading local dependency");
  fs::read(&path).await.map_err(|e| fetch_failed(e.to_string()))
}

/// Unpack a tar archive, gzip-compressed or not, into `target`.
pub fn extract(bytes: &[u8], target: &Path, strip_components: usize) -> Result<(), DependencyError> {
  if bytes.starts_with(&GZIP_MAGIC) {
    unpack(tar::Archive::new(GzDecoder::new(bytes)), target, strip_components)
  } else {
    unpack(tar::Archive::new(bytes), target, strip_components)
  }
}

fn unpack<R: Read>(mut archive: tar::Archive<R>, target: &Path, strip_components: usize) -> Result<(), DependencyError> {
  archive.set_preserve_permissions(true);
  std::fs::create_dir_all(target)?;
  let root = target.canonicalize()?;

  for entry in archive.entries()? {
    let mut entry = entry?;
    let path = entry.path()?.into_owned();

    let Some(relative) = strip(&path, strip_components)? else {
      continue;
    };
    let destination = target.join(relative);

    // Earlier symlink entries may redirect a parent outside the target.
    if let Some(parent) = destination.parent() {
      std::fs::create_dir_all(parent)?;
      ensure_within(&root, parent, &path)?;
    }
    if destination.symlink_metadata().is_ok_and(|meta| meta.file_type().is_symlink()) {
      std::fs::remove_file(&destination)?;
    }

    if entry.header().entry_type().is_hard_link() {
      let unsafe_link = || DependencyError::UnsafeArchivePath { path: path.clone() };
      let link = entry.link_name()?.ok_or_else(unsafe_link)?.into_owned();
      let source = target.join(strip(&link, strip_components)?.ok_or_else(unsafe_link)?);
      ensure_within(&root, &source, &link)?;
      std::fs::hard_link(&source, &destination)?;
      continue;
    }

    entry.unpack(&destination)?;
  }

  Ok(())
}

/// Drop the first `strip_components` components of an archive path.
///
/// Returns `None` when nothing is left. Absolute paths and `..` are refused.
fn strip(path: &Path, strip_components: usize) -> Result<Option<PathBuf>, DependencyError> {
  let mut components = Vec::new();
  for component in path.components() {
    match component {
      Component::Normal(part) => components.push(part),
      Component::CurDir => {}
      _ => return Err(DependencyError::UnsafeArchivePath { path: path.to_path_buf() }),
    }
  }

  if components.len() <= strip_components {
    return Ok(None);
  }
  Ok(Some(components[strip_components..].iter().copied().collect()))
}

fn ensure_within(root: &Path, path: &Path, entry: &Path) -> Result<(), DependencyError> {
  if path.canonicalize()?.starts_with(root) {
    Ok(())
  } else {
    Err(DependencyError::UnsafeArchivePath { path: entry.to_path_buf() })
  }
}
