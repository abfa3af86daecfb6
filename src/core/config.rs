use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for sln-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every section is optional; the defaults describe the LibLSLCC solution
/// layout, so a checkout without a config file builds as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
  pub solutions: SolutionsConfig,
  pub projects: ProjectsConfig,
  pub toolchain: ToolchainConfig,
  pub framework: FrameworkConfig,
  pub versions: VersionsConfig,
  pub archive: ArchiveConfig,
  pub installer: InstallerConfig,
  pub release: ReleaseSection,
}

/// Solution files, relative to the project root
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolutionsConfig {
  /// Solution holding the library, tools and demo (builds everywhere)
  pub no_editor: PathBuf,
  /// Solution holding the editor front-end and installer (installer host only)
  pub with_editor: PathBuf,
}

impl Default for SolutionsConfig {
  fn default() -> Self {
    Self {
      no_editor: PathBuf::from("LibLSLCC-NoEditor.sln"),
      with_editor: PathBuf::from("LibLSLCC-WithEditor-WithInstaller.sln"),
    }
  }
}

/// Project (and build target) names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectsConfig {
  pub core_library: String,
  pub cmd_tool: String,
  pub scraping_tool: String,
  pub demo_area: String,
  pub editor: String,
  pub installer: String,
}

impl Default for ProjectsConfig {
  fn default() -> Self {
    Self {
      core_library: "LibLSLCC".to_string(),
      cmd_tool: "lslcc_cmd".to_string(),
      scraping_tool: "LibraryDataScrapingTool".to_string(),
      demo_area: "DemoArea".to_string(),
      editor: "LSLCCEditor".to_string(),
      installer: "LSLCCEditorInstaller".to_string(),
    }
  }
}

/// Toolchain discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
  /// Human readable name used in diagnostics
  pub name: String,
  /// Oldest acceptable major version on the Windows host
  pub min_major: u32,
  /// Extra MSBuild versions to probe besides the well-known ones (e.g. "15.0")
  pub extra_versions: Vec<String>,
  /// Binaries searched on PATH on non-Windows hosts, in order
  pub unix_candidates: Vec<String>,
  /// Skip discovery and use this executable
  pub path: Option<PathBuf>,
}

impl Default for ToolchainConfig {
  fn default() -> Self {
    Self {
      name: "MSBuild".to_string(),
      min_major: 12,
      extra_versions: Vec::new(),
      unix_candidates: vec!["xbuild".to_string(), "msbuild".to_string()],
      path: None,
    }
  }
}

/// Target framework selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
  pub legacy: String,
  pub newer: String,
  /// Open-source runtimes with a major version above this cannot build the legacy framework
  pub open_source_threshold: u32,
}

impl Default for FrameworkConfig {
  fn default() -> Self {
    Self {
      legacy: "v4.0".to_string(),
      newer: "v4.5".to_string(),
      open_source_threshold: 3,
    }
  }
}

/// Version stamping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionsConfig {
  /// Version manifest (JSON), relative to the project root
  pub manifest: PathBuf,
  /// Directory holding `<component>/<file_name>` version files
  pub dir: PathBuf,
  pub file_name: String,
  /// Component whose version stamps the release when `[release] stamp = "version"`
  pub primary_component: Option<String>,
}

impl Default for VersionsConfig {
  fn default() -> Self {
    Self {
      manifest: PathBuf::from("version.json"),
      dir: PathBuf::from("versions"),
      file_name: "Version.cs".to_string(),
      primary_component: None,
    }
  }
}

/// Release archive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  /// File name prefix, the stamp is appended
  pub name_prefix: String,
  /// Licence placed at the archive root as `LICENSE`
  pub license: PathBuf,
  /// File name patterns never archived
  pub exclude: Vec<String>,
}

impl Default for ArchiveConfig {
  fn default() -> Self {
    Self {
      name_prefix: "LibLSLCC_Binaries".to_string(),
      license: PathBuf::from("LibLSLCC/bin/LICENSE"),
      exclude: vec!["*.tmp".to_string(), "*.vshost.*".to_string(), "*~".to_string()],
    }
  }
}

/// Installer artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
  pub extension: String,
  /// MSBuild property receiving the release version
  pub version_property: String,
}

impl Default for InstallerConfig {
  fn default() -> Self {
    Self {
      extension: "msi".to_string(),
      version_property: "ProductVersion".to_string(),
    }
  }
}

/// How release artifacts are stamped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StampStyle {
  #[default]
  Timestamp,
  Version,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseSection {
  pub stamp: StampStyle,
  /// Default output directory when `--release-dir` is not given
  pub dir: Option<PathBuf>,
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("release.toml"),
      root.join(".release.toml"),
      root.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config, falling back to defaults when no file exists
  pub fn load_or_default(root: &Path) -> ReleaseResult<Self> {
    match Self::find_config_path(root) {
      Some(path) => Self::load_from(&path),
      None => Ok(Self::default()),
    }
  }

  /// Load and validate a specific config file
  pub fn load_from(config_path: &Path) -> ReleaseResult<Self> {
    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content)?;

    config
      .validate()
      .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;

    Ok(config)
  }

  /// Reject configurations that cannot describe a build
  pub fn validate(&self) -> ReleaseResult<()> {
    let required = [
      ("projects.core_library", &self.projects.core_library),
      ("projects.cmd_tool", &self.projects.cmd_tool),
      ("projects.installer", &self.projects.installer),
      ("archive.name_prefix", &self.archive.name_prefix),
      ("framework.legacy", &self.framework.legacy),
      ("framework.newer", &self.framework.newer),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(ReleaseError::Config(ConfigError::MissingField {
          field: field.to_string(),
        }));
      }
    }

    if self.toolchain.min_major == 0 {
      return Err(ReleaseError::Config(ConfigError::Invalid {
        reason: "toolchain.min_major must be at least 1".to_string(),
      }));
    }

    if self.toolchain.unix_candidates.is_empty() {
      return Err(ReleaseError::Config(ConfigError::MissingField {
        field: "toolchain.unix_candidates".to_string(),
      }));
    }

    for pattern in &self.archive.exclude {
      glob::Pattern::new(pattern)?;
    }

    Ok(())
  }

  /// Component used for version stamps, defaulting to the core library
  pub fn primary_component(&self) -> &str {
    self
      .versions
      .primary_component
      .as_deref()
      .unwrap_or(&self.projects.core_library)
  }
}
