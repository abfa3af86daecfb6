//! Build options chosen by the user
//!
//! Built once from the command line, normalised, validated, then read-only.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use serde::Serialize;
use std::path::PathBuf;

/// Where release artifacts go when neither the command line nor `release.toml` says
pub const DEFAULT_RELEASE_DIR: &str = "BinaryRelease";

/// What the user asked to build and package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOptionSet {
  pub release_only: bool,
  pub debug_only: bool,
  pub only_core_library: bool,
  pub build_cmd_tool: bool,
  pub build_scraping_tool: bool,
  pub build_demo_area: bool,
  pub build_editor: bool,
  pub build_installer: bool,
  pub make_release: bool,
  pub release_dir: PathBuf,
  pub clean: bool,
  pub update_versions: bool,
  pub force_newer_framework: bool,
  pub dry_run: bool,
}

impl Default for BuildOptionSet {
  fn default() -> Self {
    Self {
      release_only: false,
      debug_only: false,
      only_core_library: false,
      build_cmd_tool: true,
      build_scraping_tool: true,
      build_demo_area: true,
      build_editor: true,
      build_installer: true,
      make_release: false,
      release_dir: PathBuf::from(DEFAULT_RELEASE_DIR),
      clean: false,
      update_versions: false,
      force_newer_framework: false,
      dry_run: false,
    }
  }
}

impl BuildOptionSet {
  /// Apply the flag overrides
  ///
  /// - `only_core_library` turns every auxiliary project off
  /// - `make_release` turns off projects that never ship in the archive
  pub fn normalize(mut self) -> Self {
    if self.only_core_library {
      self.build_cmd_tool = false;
      self.build_scraping_tool = false;
      self.build_demo_area = false;
      self.build_editor = false;
      self.build_installer = false;
    }

    if self.make_release {
      self.build_scraping_tool = false;
      self.build_demo_area = false;
    }

    self
  }

  /// Reject option combinations with no sensible meaning
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.release_only && self.debug_only {
      return Err(ReleaseError::Config(ConfigError::OptionConflict {
        first: "--only-release".to_string(),
        second: "--only-debug".to_string(),
      }));
    }
    Ok(())
  }

  pub fn builds_debug(&self) -> bool {
    !self.release_only
  }

  pub fn builds_release(&self) -> bool {
    !self.debug_only
  }
}
