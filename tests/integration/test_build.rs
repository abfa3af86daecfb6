//! Integration tests for target resolution and toolchain invocation

use crate::helpers::TestProject;
use anyhow::Result;

#[test]
fn test_default_build_runs_debug_then_release() -> Result<()> {
  let project = TestProject::new()?;
  project.run(&[])?;

  let calls = project.toolchain_calls();
  assert_eq!(calls.len(), 2, "calls: {:?}", calls);
  assert!(calls[0].contains("/p:Configuration=Debug"));
  assert!(calls[1].contains("/p:Configuration=Release"));
  for call in &calls {
    assert!(call.contains("/t:LibLSLCC;lslcc_cmd;LibraryDataScrapingTool;DemoArea"));
    assert!(call.contains("/p:Platform=Any CPU"));
    assert!(call.contains("LibLSLCC-NoEditor.sln"));
  }

  Ok(())
}

#[test]
fn test_only_core_library_builds_one_target() -> Result<()> {
  let project = TestProject::new()?;
  project.run(&["--only-core-library", "--only-release"])?;

  let calls = project.toolchain_calls();
  assert_eq!(calls.len(), 1);
  assert!(calls[0].contains("/t:LibLSLCC /p:Configuration=Release"));

  Ok(())
}

#[test]
fn test_dry_run_prints_commands_without_running() -> Result<()> {
  let project = TestProject::new()?;
  let output = project.run(&["--dry-run", "--clean"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Dry run"));
  assert!(stdout.contains("/t:Clean"));
  assert!(stdout.contains("\"/p:Platform=Any CPU\""));
  assert!(project.toolchain_calls().is_empty());

  Ok(())
}

#[test]
fn test_json_plan_output() -> Result<()> {
  let project = TestProject::new()?;
  let output = project.run(&["--json", "--only-release", "--make-release"])?;

  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let invocations = plan["invocations"].as_array().expect("invocations array");
  assert_eq!(invocations.len(), 1);
  assert_eq!(invocations[0]["configuration"], "Release");
  assert_eq!(invocations[0]["platform"], "Any CPU");
  assert_eq!(invocations[0]["targets"], serde_json::json!(["LibLSLCC", "lslcc_cmd"]));
  assert!(plan["framework"].as_str().unwrap().starts_with("v4."));
  assert!(plan["archive"]["path"].as_str().unwrap().contains("LibLSLCC_Binaries_"));
  assert!(plan["installers"].as_array().unwrap().is_empty());
  assert!(project.toolchain_calls().is_empty());

  Ok(())
}

#[test]
fn test_force_newer_framework() -> Result<()> {
  let project = TestProject::new()?;
  project.run(&["--only-release", "--force-newer-framework"])?;

  let calls = project.toolchain_calls();
  assert!(calls[0].contains("/p:TargetFrameworkVersion=v4.5"));

  Ok(())
}

#[test]
fn test_build_failure_halts_pipeline() -> Result<()> {
  let project = TestProject::new()?;
  let output = project.run_raw(&["--make-release"], &[("FAKE_BUILD_EXIT", "3")])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(5));
  assert!(stderr.contains("exit code 3"), "stderr: {}", stderr);
  assert_eq!(project.toolchain_calls().len(), 1);
  assert!(!project.path.join("BinaryRelease").exists());

  Ok(())
}

#[test]
fn test_conflicting_configurations_rejected() -> Result<()> {
  let project = TestProject::new()?;
  let output = project.run_raw(&["--only-release", "--only-debug"], &[])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("--only-release"));
  assert!(project.toolchain_calls().is_empty());

  Ok(())
}

#[test]
fn test_missing_toolchain_override() -> Result<()> {
  let project = TestProject::new()?;
  let missing = project.path.join("tools/not-there");
  let output = project.run_raw(&[], &[("SLN_RELEASE_TOOLCHAIN", missing.to_str().unwrap())])?;

  assert_eq!(output.status.code(), Some(4));
  assert!(String::from_utf8_lossy(&output.stderr).contains("not-there"));

  Ok(())
}
