//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Stands in for xbuild: logs its arguments, then writes one file per target
/// into `<target>/bin/AnyCPU/<configuration>` next to the solution.
/// `FAKE_BUILD_EXIT` makes every invocation fail with that code.
const FAKE_TOOLCHAIN: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
echo "$*" >> "$log"
if [ -n "$FAKE_BUILD_EXIT" ]; then
  exit "$FAKE_BUILD_EXIT"
fi
root="$(dirname "$1")"
config=""
targets=""
for arg in "$@"; do
  case "$arg" in
    /t:*) targets="${arg#/t:}" ;;
    /p:Configuration=*) config="${arg#/p:Configuration=}" ;;
  esac
done
IFS=';'
for target in $targets; do
  [ "$target" = "Clean" ] && continue
  out="$root/$target/bin/AnyCPU/$config"
  mkdir -p "$out"
  echo "$config" > "$out/$target.dll"
  echo "pdb" > "$out/$target.pdb"
  echo "junk" > "$out/$target.vshost.exe"
done
exit 0
"#;

const VERSION_FILE: &str = r#"using System.Reflection;

[assembly: AssemblyTitle("LibLSLCC")]
[assembly: AssemblyVersion("3.0.0.0")]
[assembly: AssemblyFileVersion("3.0.0.0")]
"#;

/// A solution checkout with git history and a fake toolchain
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
  pub toolchain: PathBuf,
}

impl TestProject {
  /// Project skeleton tagged `v3.0`, with a version manifest for `LibLSLCC`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    write(&path, "LibLSLCC-NoEditor.sln", "")?;
    write(&path, "LibLSLCC/LibLSLCC.csproj", "<Project />")?;
    write(&path, "LibLSLCC/bin/LICENSE", "MIT License")?;
    write(&path, "LibLSLCC/bin/ThirdPartyLicenses/ANTLR.txt", "BSD")?;
    write(&path, "versions/LibLSLCC/Version.cs", VERSION_FILE)?;
    write(
      &path,
      "version.json",
      r#"{ "LibLSLCC": { "last_tag": "v3.0", "version_template": "3.0.{commits_since_last_tag}.0" } }"#,
    )?;
    write(&path, ".gitignore", "tools/\nBinaryRelease/\n*/bin/AnyCPU/\n")?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial solution"])?;
    git(&path, &["tag", "v3.0"])?;

    let toolchain = path.join("tools/xbuild");
    write(&path, "tools/xbuild", FAKE_TOOLCHAIN)?;
    fs::set_permissions(&toolchain, fs::Permissions::from_mode(0o755))?;

    Ok(Self {
      _root: root,
      path,
      toolchain,
    })
  }

  /// Commit a change under `dir`
  pub fn commit_in(&self, dir: &str, message: &str) -> Result<()> {
    let file = format!("{}/change-{}.txt", dir, message.replace(' ', "-"));
    write(&self.path, &file, message)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Argument lines the fake toolchain was invoked with
  pub fn toolchain_calls(&self) -> Vec<String> {
    fs::read_to_string(self.path.join("tools/calls.log"))
      .map(|log| log.lines().map(String::from).collect())
      .unwrap_or_default()
  }

  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(fs::read_to_string(self.path.join(path))?)
  }

  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    write(&self.path, path, content)
  }

  /// Release archives written under `dir`
  pub fn archives(&self, dir: &str) -> Result<Vec<PathBuf>> {
    let mut archives: Vec<_> = fs::read_dir(self.path.join(dir))?
      .filter_map(|e| e.ok().map(|e| e.path()))
      .filter(|p| p.extension().is_some_and(|ext| ext == "zip"))
      .collect();
    archives.sort();
    Ok(archives)
  }

  /// Run sln-release with the fake toolchain; fails on nonzero exit
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let output = self.run_raw(args, &[])?;
    if !output.status.success() {
      anyhow::bail!(
        "sln-release {} failed\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
      );
    }
    Ok(output)
  }

  /// Run sln-release with the fake toolchain and extra environment
  pub fn run_raw(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sln-release"));
    cmd
      .current_dir(&self.path)
      .args(args)
      .env("SLN_RELEASE_TOOLCHAIN", &self.toolchain)
      .env_remove("RUST_LOG");
    for (key, value) in envs {
      cmd.env(key, value);
    }
    cmd.output().context("Failed to run sln-release")
  }
}

/// Entry names of a ZIP archive, sorted
pub fn zip_entries(archive: &Path) -> Result<Vec<String>> {
  let mut zip = zip::ZipArchive::new(fs::File::open(archive)?)?;
  let mut names = Vec::with_capacity(zip.len());
  for i in 0..zip.len() {
    names.push(zip.by_index(i)?.name().to_string());
  }
  names.sort();
  Ok(names)
}

fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}
