//! Build command integration tests.

use predicates::prelude::*;
use serial_test::serial;

use super::common::TestEnv;

const BUILD_PLAN: &str = r#"
[[entries]]
name = "go"

[entries.metadata]
build = true
"#;

#[test]
#[serial]
fn build_installs_tip_and_writes_layer_toml() {
  let env = TestEnv::new();
  env.write_plan(BUILD_PLAN);

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Gotip Buildpack 0.0.1"))
    .stdout(predicate::str::contains("Installing Go 1.19.3"))
    .stdout(predicate::str::contains("Running gotip download"))
    .stdout(predicate::str::contains("Build complete"))
    .stdout(predicate::str::contains("build, cache"));

  let layer = env.path("layers").join("go");
  assert_eq!(std::fs::read_to_string(layer.join("VERSION")).unwrap(), "devel\n");
  assert!(layer.join("bin").join("go").is_file());
  assert!(!layer.join(".git").exists());

  let metadata: toml::Table = std::fs::read_to_string(env.path("layers").join("go.toml"))
    .unwrap()
    .parse()
    .unwrap();
  let types = metadata["types"].as_table().unwrap();
  assert_eq!(types["launch"].as_bool(), Some(false));
  assert_eq!(types["build"].as_bool(), Some(true));
  assert_eq!(types["cache"].as_bool(), Some(true));

  assert!(!env.path("layers").join("temp-go.toml").exists());
}

#[test]
#[serial]
fn build_with_empty_plan_exposes_nothing() {
  let env = TestEnv::new();
  env.write_plan("");

  env
    .build_cmd()
    .assert()
    .success()
    .stdout(predicate::str::contains("Layer go: none"));
}

#[test]
#[serial]
fn build_with_invalid_plan_fails() {
  let env = TestEnv::new();
  env.write_plan("[[entries]\n");

  env
    .build_cmd()
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Failed to load build plan"));
}
