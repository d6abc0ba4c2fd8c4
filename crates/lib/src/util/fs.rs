//! Filesystem helpers for relocating installed trees.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Top-level entries of `dir` whose names do not start with `.`, sorted.
pub fn visible_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
  let mut entries = Vec::new();
  for entry in fs::read_dir(dir)? {
    let entry = entry?;
    if entry.file_name().to_string_lossy().starts_with('.') {
      continue;
    }
    entries.push(entry.path());
  }
  entries.sort();
  Ok(entries)
}

/// Move `src` to `dst`, copying across filesystems when a rename is refused.
///
/// Symlinks are moved as links, never followed.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
  match fs::rename(src, dst) {
    Ok(()) => Ok(()),
    Err(e) => {
      debug!(src = ?src, dst = ?dst, error = %e, "rename failed, copying instead");
      copy_tree(src, dst)?;
      remove_path(src)
    }
  }
}

fn is_symlink(path: &Path) -> bool {
  path
    .symlink_metadata()
    .map(|m| m.file_type().is_symlink())
    .unwrap_or(false)
}

fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
  for entry in WalkDir::new(src).follow_links(false) {
    let entry = entry.map_err(io::Error::from)?;
    let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
    let target = if relative.as_os_str().is_empty() {
      dst.to_path_buf()
    } else {
      dst.join(relative)
    };

    let file_type = entry.file_type();
    if file_type.is_dir() {
      fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
  std::os::unix::fs::symlink(fs::read_link(link)?, target)
}

#[cfg(windows)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
  let destination = fs::read_link(link)?;
  if link.is_dir() {
    std::os::windows::fs::symlink_dir(destination, target)
  } else {
    std::os::windows::fs::symlink_file(destination, target)
  }
}

/// Restore owner write permission across a tree so it can be removed.
///
/// `go` leaves its module cache read-only.
pub fn make_tree_writable(root: &Path) -> io::Result<()> {
  for entry in WalkDir::new(root).follow_links(false) {
    let entry = entry.map_err(io::Error::from)?;
    if entry.file_type().is_symlink() {
      continue;
    }
    let mut permissions = entry.metadata().map_err(io::Error::from)?.permissions();
    if set_owner_writable(&mut permissions) {
      fs::set_permissions(entry.path(), permissions)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn set_owner_writable(permissions: &mut fs::Permissions) -> bool {
  use std::os::unix::fs::PermissionsExt;

  let mode = permissions.mode();
  if mode & 0o200 != 0 {
    return false;
  }
  permissions.set_mode(mode | 0o200);
  true
}

#[cfg(windows)]
fn set_owner_writable(permissions: &mut fs::Permissions) -> bool {
  if !permissions.readonly() {
    return false;
  }
  #[allow(clippy::permissions_set_readonly_false)]
  permissions.set_readonly(false);
  true
}

fn remove_path(path: &Path) -> io::Result<()> {
  if path.is_dir() && !is_symlink(path) {
    fs::remove_dir_all(path)
  } else {
    fs::remove_file(path)
  }
}
