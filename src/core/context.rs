//! Build context - bootstrap once, pass everywhere
//!
//! ```text
//! main.rs:
//!   BuildContext::bootstrap() -> &BuildContext
//!   |
//!   v
//! commands/build.rs, versions.rs:
//!   fn run(ctx: &BuildContext, ...)
//! ```
//!
//! Bootstrapping resolves the project root, loads `release.toml` and locates
//! the toolchain. Nothing is re-executed; a missing toolchain fails here,
//! before any build or version change happens.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::toolchain::{HostProbe, ToolchainHandle, ToolchainRequirement, locate};
use std::path::{Path, PathBuf};

/// Environment variable naming a toolchain executable, bypassing discovery
pub const TOOLCHAIN_ENV: &str = "SLN_RELEASE_TOOLCHAIN";

/// Project-level state shared by every command
pub struct BuildContext {
  /// Project root (absolute)
  pub root: PathBuf,

  /// `release.toml`, or defaults when absent
  pub config: ReleaseConfig,

  pub toolchain: ToolchainHandle,
}

impl BuildContext {
  /// Load configuration and locate the toolchain
  ///
  /// `override_path` takes precedence over `[toolchain] path`; a relative
  /// config path is resolved against the project root.
  pub fn bootstrap(root: &Path, probe: &dyn HostProbe, override_path: Option<PathBuf>) -> ReleaseResult<Self> {
    // Not canonicalized: verbatim `\\?\` paths break MSBuild's legacy path handling
    let root = std::path::absolute(root).with_context(|| format!("Invalid project root: {}", root.display()))?;
    if !root.is_dir() {
      return Err(ReleaseError::with_help(
        format!("Project root not found: {}", root.display()),
        "Pass an existing directory with --root or run from the project root.",
      ));
    }
    let config = ReleaseConfig::load_or_default(&root)?;

    let mut requirement = ToolchainRequirement::from_config(&config.toolchain, override_path)?;
    requirement.override_path = requirement.override_path.map(|p| if p.is_relative() { root.join(p) } else { p });

    let toolchain = locate(&requirement, probe)?;
    tracing::debug!(root = %root.display(), toolchain = %toolchain, "bootstrapped");

    Ok(Self {
      root,
      config,
      toolchain,
    })
  }

  /// Override from [`TOOLCHAIN_ENV`], if set and non-empty
  pub fn toolchain_override_from_env() -> Option<PathBuf> {
    std::env::var_os(TOOLCHAIN_ENV)
      .filter(|v| !v.is_empty())
      .map(PathBuf::from)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::toolchain::{HostPlatform, ToolchainFlavor};
  use std::fs;
  use tempfile::TempDir;

  struct NoToolchain;

  impl HostProbe for NoToolchain {
    fn host(&self) -> HostPlatform {
      HostPlatform::Unix
    }
    fn is_64bit(&self) -> bool {
      true
    }
    fn is_file(&self, path: &Path) -> bool {
      path.is_file()
    }
    fn find_on_path(&self, _name: &str) -> Option<PathBuf> {
      None
    }
    fn runtime_banner(&self) -> Option<String> {
      None
    }
  }

  #[test]
  fn test_bootstrap_fails_without_toolchain() {
    let dir = TempDir::new().unwrap();
    let err = BuildContext::bootstrap(dir.path(), &NoToolchain, None).err().unwrap();
    assert_eq!(err.exit_code().as_i32(), 4);
  }

  #[test]
  fn test_bootstrap_with_relative_config_override() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("tools")).unwrap();
    fs::write(dir.path().join("tools/xbuild"), "").unwrap();
    fs::write(dir.path().join("release.toml"), "[toolchain]\npath = \"tools/xbuild\"\n").unwrap();

    let ctx = BuildContext::bootstrap(dir.path(), &NoToolchain, None).unwrap();
    assert!(ctx.toolchain.executable.ends_with("tools/xbuild"));
    assert!(ctx.toolchain.executable.is_absolute());
    assert_eq!(ctx.toolchain.flavor, ToolchainFlavor::OpenSource);
  }

  #[test]
  fn test_bootstrap_root_is_absolute_without_verbatim_prefix() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("xbuild"), "").unwrap();
    fs::write(dir.path().join("release.toml"), "[toolchain]\npath = \"xbuild\"\n").unwrap();

    let ctx = BuildContext::bootstrap(dir.path(), &NoToolchain, None).unwrap();
    assert!(ctx.root.is_absolute());
    assert!(!ctx.root.to_string_lossy().starts_with(r"\\?\"), "{}", ctx.root.display());
    assert_eq!(ctx.root, dir.path());
  }

  #[test]
  fn test_bootstrap_rejects_missing_root() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(BuildContext::bootstrap(&missing, &NoToolchain, None).is_err());
  }
}
