//! Installer artifact copies
//!
//! Installers are built per architecture under
//! `<project>/bin/<arch>/Release/<project>.<ext>` and published next to the
//! archive as `<project>_<arch>_<stamp>.<ext>`.

use crate::build::Platform;
use crate::core::config::ReleaseConfig;
use crate::core::error::{ArtifactError, ReleaseError, ReleaseResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Architectures installers are published for, in copy order
pub const INSTALLER_PLATFORMS: [Platform; 2] = [Platform::X64, Platform::X86];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallerCopy {
  pub source: PathBuf,
  pub destination: PathBuf,
}

/// Planned copies for every installer architecture
pub fn installer_copies(root: &Path, config: &ReleaseConfig, release_dir: &Path, stamp: &str) -> Vec<InstallerCopy> {
  let name = &config.projects.installer;
  let ext = &config.installer.extension;

  INSTALLER_PLATFORMS
    .iter()
    .map(|platform| {
      let arch = platform.output_dir();
      InstallerCopy {
        source: root
          .join(name)
          .join("bin")
          .join(arch)
          .join("Release")
          .join(format!("{}.{}", name, ext)),
        destination: release_dir.join(format!("{}_{}_{}.{}", name, arch, stamp, ext)),
      }
    })
    .collect()
}

/// Perform `copies` in order; the first failure stops the rest
pub fn copy_installers(copies: &[InstallerCopy]) -> ReleaseResult<()> {
  for copy in copies {
    println!(
      "📦 {} -> {}",
      copy.source.display(),
      copy.destination.display()
    );

    if !copy.source.is_file() {
      return Err(copy_failed(copy, "source file does not exist".to_string()));
    }
    if let Some(parent) = copy.destination.parent() {
      fs::create_dir_all(parent).map_err(|e| copy_failed(copy, e.to_string()))?;
    }
    fs::copy(&copy.source, &copy.destination).map_err(|e| copy_failed(copy, e.to_string()))?;
  }
  Ok(())
}

fn copy_failed(copy: &InstallerCopy, reason: String) -> ReleaseError {
  ReleaseError::Artifact(ArtifactError::CopyFailed {
    source: copy.source.clone(),
    destination: copy.destination.clone(),
    reason,
  })
}
