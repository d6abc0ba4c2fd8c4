//! Shared test helpers for CLI integration tests.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use tempfile::TempDir;

pub const STACK: &str = "io.buildpacks.stacks.bionic";

/// Installs a `gotip` that lays out a minimal SDK under `$HOME/sdk/gotip`.
const FAKE_GO: &str = r#"#!/bin/sh
mkdir -p "$GOPATH/bin"
cat > "$GOPATH/bin/gotip" <<'GOTIP'
#!/bin/sh
SDK="$HOME/sdk/gotip"
mkdir -p "$SDK/bin" "$SDK/.git"
echo devel > "$SDK/VERSION"
printf '#!/bin/sh\necho tip\n' > "$SDK/bin/go"
GOTIP
chmod +x "$GOPATH/bin/gotip"
"#;

/// Isolated buildpack, platform, layers and app directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    let env = Self { temp };
    for dir in ["cnb", "platform", "layers", "app"] {
      std::fs::create_dir_all(env.path(dir)).unwrap();
    }

    let bytes = go_tarball(FAKE_GO);
    std::fs::write(env.path("cnb").join("go.tgz"), &bytes).unwrap();
    std::fs::write(
      env.path("cnb").join("buildpack.toml"),
      format!(
        r#"
[buildpack]
id = "example/gotip"
name = "Gotip Buildpack"
version = "0.0.1"

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

  /// Write the buildpack plan file.
  pub fn write_plan(&self, content: &str) {
    std::fs::write(self.path("plan.toml"), content).unwrap();
  }

  /// `gotip-buildpack build` wired to this environment.
  pub fn build_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("gotip-buildpack");
    cmd
      .arg("build")
      .arg(self.path("layers"))
      .arg(self.path("platform"))
      .arg(self.path("plan.toml"))
      .env("CNB_BUILDPACK_DIR", self.path("cnb"))
      .env("CNB_STACK_ID", STACK)
      .current_dir(self.path("app"));
    cmd
  }
}

fn go_tarball(script: &str) -> Vec<u8> {
  let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
  let mut header = tar::Header::new_gnu();
  header.set_size(script.len() as u64);
  header.set_mode(0o755);
  header.set_cksum();
  builder.append_data(&mut header, "go/bin/go", script.as_bytes()).unwrap();
  builder.into_inner().unwrap().finish().unwrap()
}
