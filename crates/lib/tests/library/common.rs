//! Shared fixtures for pipeline tests.

use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use gotip_lib::buildpack::BuildpackInfo;
use gotip_lib::context::BuildContext;
use gotip_lib::env::Environment;
use gotip_lib::layers::Layers;
use gotip_lib::plan::{BuildpackPlan, BuildpackPlanEntry};

pub const STACK: &str = "io.buildpacks.stacks.bionic";

/// A `go` that only knows `install`, and writes a `gotip` that only knows
/// `download`.
pub const FAKE_GO: &str = r#"#!/bin/sh
[ "$1" = "install" ] || { echo "unexpected go args: $*" >&2; exit 2; }
mkdir -p "$GOPATH/bin"
cat > "$GOPATH/bin/gotip" <<'GOTIP'
#!/bin/sh
[ "$1" = "download" ] || exit 2
SDK="$HOME/sdk/gotip"
mkdir -p "$SDK/bin" "$SDK/src/fmt" "$SDK/.git"
printf 'devel go1.20-abcdef\n' > "$SDK/VERSION"
printf '#!/bin/sh\necho tip\n' > "$SDK/bin/go"
echo "ref: refs/heads/master" > "$SDK/.git/HEAD"
echo "Success. You may now run 'gotip'!"
GOTIP
chmod +x "$GOPATH/bin/gotip"
echo "go: downloading golang.org/dl"
"#;

/// A `go` whose `gotip` cannot reach the network.
pub const FAKE_GO_OFFLINE: &str = r#"#!/bin/sh
mkdir -p "$GOPATH/bin"
cat > "$GOPATH/bin/gotip" <<'GOTIP'
#!/bin/sh
echo "fatal: unable to access 'https://go.googlesource.com/go/'" >&2
exit 128
GOTIP
chmod +x "$GOPATH/bin/gotip"
"#;

/// Gzipped tarball with `go/bin/go` holding `script`.
pub fn go_tarball(script: &str) -> Vec<u8> {
  let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
  let mut header = tar::Header::new_gnu();
  header.set_size(script.len() as u64);
  header.set_mode(0o755);
  header.set_cksum();
  builder.append_data(&mut header, "go/bin/go", script.as_bytes()).unwrap();
  builder.into_inner().unwrap().finish().unwrap()
}

/// Isolated buildpack, platform, layers and app directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create a buildpack whose only `go` dependency is `script` packaged as a
  /// tarball next to `buildpack.toml`.
  pub fn with_go(script: &str) -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };

    for dir in ["cnb", "platform", "layers", "app"] {
      std::fs::create_dir_all(env.path(dir)).unwrap();
    }

    let bytes = go_tarball(script);
    std::fs::write(env.path("cnb").join("go.tgz"), &bytes).unwrap();
    std::fs::write(
      env.path("cnb").join("buildpack.toml"),
      format!(
        r#"
api = "0.7"

[buildpack]
id = "example/gotip"
name = "Gotip Buildpack"
version = "0.0.1"

[metadata.default-versions]
go = "1.19.*"

[[metadata.dependencies]]
id = "go"
version = "1.19.3"
stacks = ["{STACK}"]
uri = "go.tgz"
checksum = "sha256:{}"
strip-components = 1
"#,
        hex::encode(Sha256::digest(&bytes))
      ),
    )
    .unwrap();

    env
  }

  pub fn path(&self, name: &str) -> PathBuf {
    self.temp.path().join(name)
  }

  pub fn layers(&self) -> PathBuf {
    self.path("layers")
  }

  pub fn context(&self, entries: Vec<BuildpackPlanEntry>) -> BuildContext {
    BuildContext {
      buildpack_info: BuildpackInfo {
        id: "example/gotip".to_string(),
        name: "Gotip Buildpack".to_string(),
        version: "0.0.1".to_string(),
        homepage: None,
      },
      cnb_path: self.path("cnb"),
      stack: STACK.to_string(),
      working_dir: self.path("app"),
      platform_path: self.path("platform"),
      plan: BuildpackPlan { entries },
      layers: Layers::new(self.layers()),
      environment: Environment::new(vec!["PATH=/usr/bin:/bin".to_string(), "HOME=/nonexistent".to_string()]),
    }
  }
}

/// Names of the entries directly under `dir`, sorted.
pub fn entry_names(dir: &Path) -> Vec<String> {
  let mut names: Vec<String> = std::fs::read_dir(dir)
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}
