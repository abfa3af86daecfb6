//! Integration tests for `--update-versions`

use crate::helpers::TestProject;
use anyhow::Result;

const VERSION_FILE: &str = "versions/LibLSLCC/Version.cs";

#[test]
fn test_update_versions_counts_commits_since_tag() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_in("LibLSLCC", "first change")?;
  project.commit_in("LibLSLCC", "second change")?;
  project.commit_in("DemoArea", "unrelated change")?;

  let output = project.run(&["--update-versions", "--only-core-library", "--only-release"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let content = project.read_file(VERSION_FILE)?;
  assert!(content.contains(r#"[assembly: AssemblyVersion("3.0.2.0")]"#), "{}", content);
  assert!(content.contains(r#"[assembly: AssemblyFileVersion("3.0.2.0")]"#));
  assert!(content.contains(r#"[assembly: AssemblyTitle("LibLSLCC")]"#));
  assert!(stdout.contains("3.0.0.0 -> 3.0.2.0"));
  assert!(!project.path.join("versions/LibLSLCC/Version.cs.tmp").exists());

  Ok(())
}

#[test]
fn test_update_versions_is_idempotent() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_in("LibLSLCC", "change")?;

  project.run(&["--update-versions", "--only-core-library", "--only-release"])?;
  let first = std::fs::read(project.path.join(VERSION_FILE))?;

  let output = project.run(&["--update-versions", "--only-core-library", "--only-release"])?;
  let second = std::fs::read(project.path.join(VERSION_FILE))?;

  assert_eq!(first, second);
  assert!(String::from_utf8_lossy(&output.stdout).contains("unchanged"));

  Ok(())
}

#[test]
fn test_dry_run_leaves_version_file_alone() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_in("LibLSLCC", "change")?;
  let before = project.read_file(VERSION_FILE)?;

  let output = project.run(&["--update-versions", "--dry-run"])?;

  assert_eq!(project.read_file(VERSION_FILE)?, before);
  assert!(String::from_utf8_lossy(&output.stdout).contains("would update"));

  Ok(())
}

#[test]
fn test_unknown_tag_only_affects_its_component() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file(
    "version.json",
    r#"{
  "LibLSLCC": { "last_tag": "v3.0", "version_template": "3.0.{n}.0" },
  "lslcc_cmd": { "last_tag": "no-such-tag", "version_template": "1.0.{n}.0" }
}"#,
  )?;
  project.write_file(
    "versions/lslcc_cmd/Version.cs",
    "[assembly: AssemblyVersion(\"1.0.0.0\")]\n[assembly: AssemblyFileVersion(\"1.0.0.0\")]\n",
  )?;
  crate::helpers::git(&project.path, &["add", "."])?;
  crate::helpers::git(&project.path, &["commit", "-m", "add cmd versioning"])?;
  project.commit_in("LibLSLCC", "change")?;

  let output = project.run(&["--update-versions", "--only-core-library", "--only-release"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(project.read_file(VERSION_FILE)?.contains("3.0.1.0"));
  assert!(project.read_file("versions/lslcc_cmd/Version.cs")?.contains("1.0.0.0"));
  assert!(stdout.contains("lslcc_cmd"), "stdout: {}", stdout);
  assert_eq!(project.toolchain_calls().len(), 1);

  Ok(())
}

#[test]
fn test_missing_manifest_is_fatal() -> Result<()> {
  let project = TestProject::new()?;
  std::fs::remove_file(project.path.join("version.json"))?;

  let output = project.run_raw(&["--update-versions"], &[])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Version manifest not found"));
  assert!(project.toolchain_calls().is_empty());

  Ok(())
}

#[test]
fn test_json_plan_reports_resolved_versions() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_in("LibLSLCC", "change")?;

  let output = project.run(&["--json", "--update-versions"])?;
  let plan: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(plan["versions"][0]["component"], "LibLSLCC");
  assert_eq!(plan["versions"][0]["resolved_version"], "3.0.1.0");
  assert_eq!(plan["versions"][0]["commits_since_tag"], 1);
  // --json never writes
  assert!(project.read_file(VERSION_FILE)?.contains("3.0.0.0"));

  Ok(())
}
