//! The ordered stages of a build.

use std::fmt;

use serde::Serialize;

/// One step of the build pipeline. Stages run in [`Stage::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  /// Reset the scratch layer and announce the buildpack.
  Init,
  /// Resolve the base Go toolchain.
  ResolveBase,
  /// Deliver the base toolchain into the scratch layer.
  InstallBase,
  /// `go install golang.org/dl/gotip@latest`
  InstallVersionManager,
  /// `gotip download`
  RunVersionManagerDownload,
  /// Reset the toolchain layer and set its flags.
  PreparePersistentLayer,
  /// Move the downloaded SDK into the toolchain layer.
  RelocateSdk,
}

impl Stage {
  pub const ALL: [Stage; 7] = [
    Stage::Init,
    Stage::ResolveBase,
    Stage::InstallBase,
    Stage::InstallVersionManager,
    Stage::RunVersionManagerDownload,
    Stage::PreparePersistentLayer,
    Stage::RelocateSdk,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Stage::Init => "init",
      Stage::ResolveBase => "resolve_base",
      Stage::InstallBase => "install_base",
      Stage::InstallVersionManager => "install_version_manager",
      Stage::RunVersionManagerDownload => "run_version_manager_download",
      Stage::PreparePersistentLayer => "prepare_persistent_layer",
      Stage::RelocateSdk => "relocate_sdk",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
