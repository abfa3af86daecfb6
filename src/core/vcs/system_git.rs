//! System git backend
//!
//! Shells out to the `git` binary with an isolated environment. Only the
//! read-only queries version stamping needs are implemented.

use super::CommitHistory;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::utils::path_to_git_format;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// Directory git runs in; pathspecs are relative to it
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to get the repository metadata.
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(ReleaseError::with_help(
          format!("Git repository not found at: {}", path.display()),
          "Version stamping counts commits since the last tag, run it from a git checkout.",
        ));
      }
      return Err(ReleaseError::message(format!("Failed to open git repository: {}", stderr)));
    }

    tracing::debug!(
      work_tree = %String::from_utf8_lossy(&output.stdout).trim(),
      "opened git repository"
    );

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }
    // Windows git needs these to locate its own config and temp dirs
    for var in ["SYSTEMROOT", "USERPROFILE", "TEMP", "TMP"] {
      if let Ok(value) = std::env::var(var) {
        cmd.env(var, value);
      }
    }

    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}

impl CommitHistory for SystemGit {
  fn commits_since(&self, tag: &str, path: &Path) -> ReleaseResult<u64> {
    let range = format!("{}..HEAD", tag.trim());
    let output = self
      .git_cmd()
      .args(["rev-list", "--count", &range, "--"])
      .arg(path_to_git_format(path))
      .output()
      .context("Failed to run git rev-list")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::message(format!(
        "git rev-list --count {} failed: {}",
        range,
        stderr.trim()
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_count(&stdout)
  }
}

fn parse_count(stdout: &str) -> ReleaseResult<u64> {
  stdout
    .trim()
    .parse()
    .map_err(|_| ReleaseError::message(format!("Unexpected git rev-list output: '{}'", stdout.trim())))
}
