//! Integration tests for `--make-release`

use crate::helpers::{TestProject, zip_entries};
use anyhow::Result;

#[test]
fn test_release_only_archive_holds_release_output_and_licences() -> Result<()> {
  let project = TestProject::new()?;
  let output = project.run(&["--only-release", "--make-release"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let calls = project.toolchain_calls();
  assert_eq!(calls.len(), 1);
  assert!(calls[0].contains("/t:LibLSLCC;lslcc_cmd"));

  let archives = project.archives("BinaryRelease")?;
  assert_eq!(archives.len(), 1);
  let name = archives[0].file_name().unwrap().to_string_lossy().to_string();
  assert!(name.starts_with("LibLSLCC_Binaries_"), "{}", name);
  assert!(name.ends_with("M.zip"), "{}", name);

  let entries = zip_entries(&archives[0])?;
  assert_eq!(
    entries,
    vec![
      "LICENSE",
      "LibLSLCC/AnyCPU/Release/LibLSLCC.dll",
      "LibLSLCC/AnyCPU/Release/LibLSLCC.pdb",
      "LibLSLCC/ThirdPartyLicenses/ANTLR.txt",
      "lslcc_cmd/AnyCPU/Release/lslcc_cmd.dll",
      "lslcc_cmd/AnyCPU/Release/lslcc_cmd.pdb",
    ]
  );
  assert!(entries.iter().all(|e| !e.contains("Debug")));
  assert!(stdout.contains("sha256:"));

  let release_dir: Vec<_> = std::fs::read_dir(project.path.join("BinaryRelease"))?
    .filter_map(|e| e.ok())
    .collect();
  assert_eq!(release_dir.len(), 1, "no installer copies on this host");

  Ok(())
}

#[test]
fn test_release_includes_debug_output_when_built() -> Result<()> {
  let project = TestProject::new()?;
  project.run(&["--make-release"])?;

  let calls = project.toolchain_calls();
  assert_eq!(calls.len(), 2);
  // only the Release build of the command-line tool ships
  assert!(calls[0].contains("/t:LibLSLCC /p:Configuration=Debug"));

  let entries = zip_entries(&project.archives("BinaryRelease")?[0])?;
  assert!(entries.contains(&"LibLSLCC/AnyCPU/Debug/LibLSLCC.dll".to_string()));
  assert!(entries.contains(&"LibLSLCC/AnyCPU/Release/LibLSLCC.dll".to_string()));
  assert!(!entries.iter().any(|e| e.starts_with("lslcc_cmd/AnyCPU/Debug")));
  assert!(!entries.iter().any(|e| e.starts_with("DemoArea")));

  Ok(())
}

#[test]
fn test_release_dir_and_version_stamp_from_config() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file(
    "release.toml",
    "[release]\nstamp = \"version\"\ndir = \"dist\"\n\n[archive]\nname_prefix = \"LSLCC\"\n",
  )?;

  project.run(&["--only-release", "--make-release"])?;

  let archives = project.archives("dist")?;
  assert_eq!(archives.len(), 1);
  assert!(archives[0].ends_with("LSLCC_3.0.0.0.zip"));

  Ok(())
}

#[test]
fn test_release_dir_flag_wins_over_config() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("release.toml", "[release]\ndir = \"dist\"\n")?;

  project.run(&["--only-release", "--make-release", "--release-dir", "out"])?;

  assert_eq!(project.archives("out")?.len(), 1);
  assert!(!project.path.join("dist").exists());

  Ok(())
}

#[test]
fn test_identical_builds_give_identical_archives() -> Result<()> {
  let project = TestProject::new()?;
  project.write_file("release.toml", "[release]\nstamp = \"version\"\n")?;

  project.run(&["--only-release", "--make-release", "--release-dir", "a"])?;
  project.run(&["--only-release", "--make-release", "--release-dir", "b"])?;

  let a = std::fs::read(&project.archives("a")?[0])?;
  let b = std::fs::read(&project.archives("b")?[0])?;
  assert_eq!(a, b);

  Ok(())
}

#[test]
fn test_missing_licence_fails_packaging() -> Result<()> {
  let project = TestProject::new()?;
  std::fs::remove_file(project.path.join("LibLSLCC/bin/LICENSE"))?;

  let output = project.run_raw(&["--only-release", "--make-release"], &[])?;

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Licence file not found"));
  assert!(project.archives("BinaryRelease").map(|a| a.is_empty()).unwrap_or(true));

  Ok(())
}
