//! Build toolchain discovery
//!
//! The external build tool is found once, during bootstrap, and described by
//! an immutable [`ToolchainHandle`] that is passed to every component needing it.
//!
//! - **locate**: host probing and newest-version selection
//! - **version**: four-part toolchain / runtime version numbers

pub mod locate;
pub mod version;

pub use locate::{HostProbe, SystemProbe, ToolchainRequirement, locate};
pub use version::ToolchainVersion;

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Host operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostPlatform {
  Windows,
  Unix,
}

impl HostPlatform {
  /// Platform of the running process
  pub fn current() -> Self {
    if cfg!(windows) { HostPlatform::Windows } else { HostPlatform::Unix }
  }

  /// Installers (and the editor front-end) only build on Windows
  pub fn supports_installer(self) -> bool {
    matches!(self, HostPlatform::Windows)
  }
}

/// Which family of build tool was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainFlavor {
  /// Proprietary MSBuild from a Visual Studio / Build Tools install
  MsBuild,
  /// Open-source equivalent (xbuild / mono msbuild)
  OpenSource,
}

/// A discovered, version-compatible build tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolchainHandle {
  pub executable: PathBuf,
  pub host: HostPlatform,
  pub flavor: ToolchainFlavor,
  pub version: ToolchainVersion,
  /// Version reported by the hosting runtime (`mono --version`), if any
  pub runtime_version: Option<ToolchainVersion>,
}

impl ToolchainHandle {
  pub fn is_open_source(&self) -> bool {
    self.flavor == ToolchainFlavor::OpenSource
  }

  /// Runtime major version, used for target framework selection
  pub fn runtime_major(&self) -> Option<u32> {
    self.runtime_version.map(|v| v.major)
  }
}

impl fmt::Display for ToolchainHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.executable.display(), self.version)?;
    if let Some(runtime) = self.runtime_version {
      write!(f, " on runtime {}", runtime)?;
    }
    Ok(())
  }
}
