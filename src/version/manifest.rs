//! Version manifest (`version.json`)
//!
//! ```json
//! {
//!   "LibLSLCC": {
//!     "last_tag": "LibLSLCC-v3.0.0",
//!     "version_template": "3.0.{commits_since_last_tag}.0"
//!   }
//! }
//! ```
//!
//! Optional per-entry keys: `path` (git path scope, default: the component
//! name) and `version_file` (default: `<versions.dir>/<component>/<file_name>`).

use crate::core::config::VersionsConfig;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Placeholders replaced with the commit count
const PLACEHOLDERS: [&str; 2] = ["{commits_since_last_tag}", "{n}"];

#[derive(Debug, Deserialize)]
struct RawEntry {
  last_tag: Option<String>,
  version_template: Option<String>,
  path: Option<PathBuf>,
  version_file: Option<PathBuf>,
}

/// One versioned component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  pub component: String,
  pub last_tag: String,
  pub version_template: String,
  /// Path scope for the commit count, relative to the project root
  pub path: PathBuf,
  /// Embedded version file, absolute
  pub version_file: PathBuf,
}

impl ManifestEntry {
  /// Resolve the template for a given commit distance
  pub fn render(&self, commits_since_tag: u64) -> String {
    render_template(&self.version_template, commits_since_tag)
  }
}

/// Substitute the commit count into a version template
pub fn render_template(template: &str, commits_since_tag: u64) -> String {
  let count = commits_since_tag.to_string();
  PLACEHOLDERS
    .iter()
    .fold(template.to_string(), |acc, placeholder| acc.replace(placeholder, &count))
}

/// All versioned components, ordered by name
#[derive(Debug, Clone, Default)]
pub struct VersionManifest {
  entries: BTreeMap<String, ManifestEntry>,
}

impl VersionManifest {
  /// Load `[versions] manifest` under `root`
  pub fn load(root: &Path, config: &VersionsConfig) -> ReleaseResult<Self> {
    let path = root.join(&config.manifest);
    if !path.is_file() {
      return Err(ReleaseError::Config(ConfigError::ManifestNotFound { path }));
    }

    let content = fs::read_to_string(&path)?;
    Self::parse(&content, root, config).map_err(|e| match e {
      ReleaseError::Config(ConfigError::Invalid { reason }) => ReleaseError::Config(ConfigError::Invalid {
        reason: format!("{} ({})", reason, path.display()),
      }),
      other => other,
    })
  }

  /// Parse manifest JSON; every entry is validated before anything is returned
  pub fn parse(content: &str, root: &Path, config: &VersionsConfig) -> ReleaseResult<Self> {
    let raw: BTreeMap<String, RawEntry> = serde_json::from_str(content).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        reason: format!("malformed version manifest: {}", e),
      })
    })?;

    let mut entries = BTreeMap::new();
    for (component, entry) in raw {
      let last_tag = required(&component, "last_tag", entry.last_tag)?;
      let version_template = required(&component, "version_template", entry.version_template)?;

      let path = entry.path.unwrap_or_else(|| PathBuf::from(&component));
      let version_file = match entry.version_file {
        Some(file) => root.join(file),
        None => root.join(&config.dir).join(&component).join(&config.file_name),
      };

      entries.insert(
        component.clone(),
        ManifestEntry {
          component,
          last_tag,
          version_template,
          path,
          version_file,
        },
      );
    }

    Ok(Self { entries })
  }

  pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> {
    self.entries.values()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Look up one component
  pub fn get(&self, component: &str) -> ReleaseResult<&ManifestEntry> {
    self.entries.get(component).ok_or_else(|| {
      ReleaseError::Config(ConfigError::ComponentNotFound {
        name: component.to_string(),
      })
    })
  }
}

fn required(component: &str, field: &str, value: Option<String>) -> ReleaseResult<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v),
    _ => Err(ReleaseError::Config(ConfigError::MissingField {
      field: format!("{}.{}", component, field),
    })),
  }
}
