//! Find a usable build tool on the host
//!
//! Windows hosts probe the well-known MSBuild install roots and keep the
//! newest version that satisfies the minimum. Other hosts look up the
//! open-source equivalent on `PATH` and record the runtime version, which
//! later decides the target framework.

use super::{HostPlatform, ToolchainFlavor, ToolchainHandle, ToolchainVersion};
use crate::core::config::ToolchainConfig;
use crate::core::error::{ReleaseError, ReleaseResult, ToolchainError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// MSBuild versions installed by Visual Studio 2013 / 2015 and their standalone packages
const KNOWN_MSBUILD_VERSIONS: [&str; 2] = ["12.0", "14.0"];

const MSBUILD_ROOT: &str = r"C:\Program Files (x86)\MSBuild";

const WINDOWS_REMEDIATION: &str = "Install Visual Studio 2012 or newer, or a standalone MSBuild:\n  \
   MSBuild 12.0: https://www.microsoft.com/en-us/download/details.aspx?id=40760\n  \
   MSBuild 14.0: https://www.microsoft.com/en-in/download/details.aspx?id=48159";

const UNIX_REMEDIATION: &str = "Install mono (https://www.mono-project.com/download/) so that xbuild is on your PATH.";

/// What the host must provide
#[derive(Debug, Clone)]
pub struct ToolchainRequirement {
  pub name: String,
  pub min_major: u32,
  pub extra_versions: Vec<ToolchainVersion>,
  pub unix_candidates: Vec<String>,
  pub override_path: Option<PathBuf>,
}

impl ToolchainRequirement {
  /// Build from `[toolchain]`, with an optional override taking precedence over the config path
  pub fn from_config(config: &ToolchainConfig, override_path: Option<PathBuf>) -> ReleaseResult<Self> {
    let extra_versions = config
      .extra_versions
      .iter()
      .map(|v| v.parse::<ToolchainVersion>().map_err(ReleaseError::message))
      .collect::<ReleaseResult<Vec<_>>>()?;

    Ok(Self {
      name: config.name.clone(),
      min_major: config.min_major,
      extra_versions,
      unix_candidates: config.unix_candidates.clone(),
      override_path: override_path.or_else(|| config.path.clone()),
    })
  }

  fn describe(&self, host: HostPlatform) -> String {
    match host {
      HostPlatform::Windows => format!("{} {}.0 or newer", self.name, self.min_major),
      HostPlatform::Unix => format!("one of [{}] on PATH", self.unix_candidates.join(", ")),
    }
  }
}

/// Everything discovery needs to know about the host
pub trait HostProbe {
  fn host(&self) -> HostPlatform;

  /// Whether architecture-matched 64-bit binaries should be preferred
  fn is_64bit(&self) -> bool;

  fn is_file(&self, path: &Path) -> bool;

  fn find_on_path(&self, name: &str) -> Option<PathBuf>;

  /// First lines of the runtime's version report, if a runtime is present
  fn runtime_banner(&self) -> Option<String>;
}

/// Host architecture from the processor environment, not the build target
///
/// A 32-bit process on 64-bit Windows sees `x86` in `PROCESSOR_ARCHITECTURE`
/// and the real architecture in `PROCESSOR_ARCHITEW6432`.
fn host_is_64bit(var: impl Fn(&str) -> Option<String>) -> bool {
  match var("PROCESSOR_ARCHITEW6432").or_else(|| var("PROCESSOR_ARCHITECTURE")) {
    Some(arch) => matches!(arch.to_ascii_uppercase().as_str(), "AMD64" | "ARM64" | "IA64"),
    None => matches!(std::env::consts::ARCH, "x86_64" | "aarch64"),
  }
}

/// Probe backed by the real filesystem and processes
pub struct SystemProbe;

impl HostProbe for SystemProbe {
  fn host(&self) -> HostPlatform {
    HostPlatform::current()
  }

  fn is_64bit(&self) -> bool {
    host_is_64bit(|key| std::env::var(key).ok())
  }

  fn is_file(&self, path: &Path) -> bool {
    path.is_file()
  }

  fn find_on_path(&self, name: &str) -> Option<PathBuf> {
    which::which(name).ok()
  }

  fn runtime_banner(&self) -> Option<String> {
    let output = Command::new("mono").arg("--version").output().ok()?;
    if !output.status.success() {
      return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

/// Locate the newest toolchain satisfying `requirement`
pub fn locate(requirement: &ToolchainRequirement, probe: &dyn HostProbe) -> ReleaseResult<ToolchainHandle> {
  let host = probe.host();

  if let Some(path) = &requirement.override_path {
    return locate_override(path, host, probe);
  }

  match host {
    HostPlatform::Windows => locate_windows(requirement, probe),
    HostPlatform::Unix => locate_unix(requirement, probe),
  }
}

fn locate_override(path: &Path, host: HostPlatform, probe: &dyn HostProbe) -> ReleaseResult<ToolchainHandle> {
  if !probe.is_file(path) {
    return Err(ReleaseError::Toolchain(ToolchainError::OverrideMissing {
      path: path.to_path_buf(),
    }));
  }

  tracing::debug!(path = %path.display(), "using configured toolchain");

  let (flavor, runtime_version) = match host {
    HostPlatform::Windows => (ToolchainFlavor::MsBuild, None),
    HostPlatform::Unix => (ToolchainFlavor::OpenSource, runtime_version(probe)),
  };

  Ok(ToolchainHandle {
    executable: path.to_path_buf(),
    host,
    flavor,
    version: runtime_version.unwrap_or_default(),
    runtime_version,
  })
}

/// Candidate executables for one MSBuild version, most preferred first
fn msbuild_candidates(version: &str, is_64bit: bool) -> Vec<PathBuf> {
  let mut candidates = Vec::with_capacity(2);
  if is_64bit {
    candidates.push(PathBuf::from(format!(r"{}\{}\bin\amd64\MSBuild.exe", MSBUILD_ROOT, version)));
  }
  candidates.push(PathBuf::from(format!(r"{}\{}\bin\MSBuild.exe", MSBUILD_ROOT, version)));
  candidates
}

fn locate_windows(requirement: &ToolchainRequirement, probe: &dyn HostProbe) -> ReleaseResult<ToolchainHandle> {
  let mut versions: Vec<ToolchainVersion> = KNOWN_MSBUILD_VERSIONS
    .iter()
    .filter_map(|v| v.parse::<ToolchainVersion>().ok())
    .chain(requirement.extra_versions.iter().copied())
    .filter(|v: &ToolchainVersion| v.major >= requirement.min_major)
    .collect();
  versions.sort_unstable_by(|a, b| b.cmp(a));
  versions.dedup();

  for version in versions {
    let dir_name = format!("{}.{}", version.major, version.minor);
    for candidate in msbuild_candidates(&dir_name, probe.is_64bit()) {
      tracing::debug!(candidate = %candidate.display(), "probing");
      if probe.is_file(&candidate) {
        return Ok(ToolchainHandle {
          executable: candidate,
          host: HostPlatform::Windows,
          flavor: ToolchainFlavor::MsBuild,
          version,
          runtime_version: None,
        });
      }
    }
  }

  Err(ReleaseError::Toolchain(ToolchainError::NotFound {
    requirement: requirement.describe(HostPlatform::Windows),
    remediation: WINDOWS_REMEDIATION.to_string(),
  }))
}

fn locate_unix(requirement: &ToolchainRequirement, probe: &dyn HostProbe) -> ReleaseResult<ToolchainHandle> {
  let executable = requirement
    .unix_candidates
    .iter()
    .find_map(|name| probe.find_on_path(name))
    .ok_or_else(|| {
      ReleaseError::Toolchain(ToolchainError::NotFound {
        requirement: requirement.describe(HostPlatform::Unix),
        remediation: UNIX_REMEDIATION.to_string(),
      })
    })?;

  let runtime_version = runtime_version(probe);
  tracing::debug!(
    executable = %executable.display(),
    runtime = ?runtime_version,
    "found open-source toolchain"
  );

  Ok(ToolchainHandle {
    executable,
    host: HostPlatform::Unix,
    flavor: ToolchainFlavor::OpenSource,
    version: runtime_version.unwrap_or_default(),
    runtime_version,
  })
}

fn runtime_version(probe: &dyn HostProbe) -> Option<ToolchainVersion> {
  probe
    .runtime_banner()
    .as_deref()
    .and_then(ToolchainVersion::from_banner)
}
