//! Full build runs with the real dependency service and process runner.

use gotip_lib::build::{Build, Stage, StageError};
use gotip_lib::consts::{GO_EXECUTABLE, GOTIP_EXECUTABLE};
use gotip_lib::dependency::Service;
use gotip_lib::exec::ProcessExecutable;
use gotip_lib::layers::{LayerState, Layers};
use gotip_lib::logs::Emitter;
use gotip_lib::plan::{BuildpackPlanEntry, Planner};

use super::common::{FAKE_GO, FAKE_GO_OFFLINE, TestEnv, entry_names};

fn real_build() -> Build<Planner, Service, ProcessExecutable, ProcessExecutable> {
  Build::new(
    Planner::new(),
    Service::new(),
    ProcessExecutable::new(GO_EXECUTABLE),
    ProcessExecutable::new(GOTIP_EXECUTABLE),
    Emitter::discard(),
  )
}

#[tokio::test]
async fn build_relocates_tip_sdk() {
  let env = TestEnv::with_go(FAKE_GO);
  let context = env.context(vec![BuildpackPlanEntry::new("go").with_flag("build", true)]);

  let result = real_build().run(&context).await.unwrap();

  let layer = &result.layers[0];
  assert_eq!(layer.path, env.layers().join("go"));
  assert_eq!(layer.state, LayerState::Populated);
  assert!(!layer.launch && layer.build && layer.cache);

  assert_eq!(entry_names(&layer.path), vec!["VERSION", "bin", "src"]);
  assert_eq!(
    std::fs::read_to_string(layer.path.join("VERSION")).unwrap(),
    "devel go1.20-abcdef\n"
  );

  assert_eq!(result.executions.len(), 2);
  assert!(result.executions[0].output.contains("go: downloading golang.org/dl"));
  assert!(result.executions[1].output.contains("You may now run 'gotip'"));
}

#[tokio::test]
async fn scratch_layer_keeps_only_base_toolchain() {
  let env = TestEnv::with_go(FAKE_GO);
  let context = env.context(vec![BuildpackPlanEntry::new("go").with_flag("launch", true)]);

  real_build().run(&context).await.unwrap();

  assert_eq!(entry_names(&env.layers().join("temp-go")), vec!["bin"]);
}

#[tokio::test]
async fn metadata_written_after_build_restores_flags() {
  let env = TestEnv::with_go(FAKE_GO);
  let context = env.context(vec![BuildpackPlanEntry::new("go").with_flag("build", true)]);

  let result = real_build().run(&context).await.unwrap();
  result.layers[0].write_metadata().unwrap();

  let restored = Layers::new(env.layers()).get("go").unwrap();
  assert!(!restored.launch);
  assert!(restored.build);
  assert!(restored.cache);
}

#[tokio::test]
async fn rebuild_replaces_previous_sdk() {
  let env = TestEnv::with_go(FAKE_GO);
  let context = env.context(vec![BuildpackPlanEntry::new("go").with_flag("build", true)]);
  std::fs::create_dir_all(env.layers().join("go").join("stale")).unwrap();

  real_build().run(&context).await.unwrap();

  assert!(!env.layers().join("go").join("stale").exists());
  assert!(env.layers().join("go").join("bin").join("go").is_file());
}

#[tokio::test]
async fn offline_download_fails_with_stage() {
  let env = TestEnv::with_go(FAKE_GO_OFFLINE);
  let context = env.context(vec![BuildpackPlanEntry::new("go").with_flag("build", true)]);

  let err = real_build().run(&context).await.unwrap_err();

  assert_eq!(err.stage, Stage::RunVersionManagerDownload);
  assert!(matches!(err.source, StageError::Exec { ref command, .. } if command == "gotip download"));
  assert!(!env.layers().join("go").exists());
  assert_eq!(entry_names(&env.layers().join("temp-go")), vec!["bin"]);
}

#[tokio::test]
async fn checksum_mismatch_fails_install() {
  let env = TestEnv::with_go(FAKE_GO);
  std::fs::write(env.path("cnb").join("go.tgz"), b"tampered").unwrap();
  let context = env.context(Vec::new());

  let err = real_build().run(&context).await.unwrap_err();

  assert_eq!(err.stage, Stage::InstallBase);
  assert!(err.to_string().contains("checksum"));
}
