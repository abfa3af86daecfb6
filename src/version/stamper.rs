//! Rewrite embedded assembly versions from tag distance
//!
//! For each component the commit count since its last release tag is
//! substituted into the version template. The version file is only touched
//! when the resolved version differs from the one it already carries, and
//! is replaced via a sibling temp file + rename so an interrupted write never
//! leaves a truncated source file behind.

use super::manifest::{ManifestEntry, VersionManifest};
use crate::core::error::{ReleaseError, ReleaseResult, VersionError};
use crate::core::vcs::CommitHistory;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const ASSEMBLY_VERSION: &str = r#"(\[assembly:\s*AssemblyVersion\(")([^"]*)("\)\])"#;
const ASSEMBLY_FILE_VERSION: &str = r#"(\[assembly:\s*AssemblyFileVersion\(")([^"]*)("\)\])"#;

/// Outcome for one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
  pub component: String,
  pub last_tag: String,
  pub version_template: String,
  pub commits_since_tag: u64,
  pub previous_version: String,
  pub resolved_version: String,
  pub version_file: PathBuf,
}

impl VersionRecord {
  pub fn changed(&self) -> bool {
    self.previous_version != self.resolved_version
  }
}

/// Outcome for a whole manifest
#[derive(Debug, Default)]
pub struct StampReport {
  pub records: Vec<VersionRecord>,
  /// Components whose version could not be resolved; the others were still processed
  pub failures: Vec<(String, ReleaseError)>,
}

impl StampReport {
  /// component -> (previous, resolved), for components whose version moved
  pub fn changes(&self) -> BTreeMap<String, (String, String)> {
    self
      .records
      .iter()
      .filter(|r| r.changed())
      .map(|r| {
        (
          r.component.clone(),
          (r.previous_version.clone(), r.resolved_version.clone()),
        )
      })
      .collect()
  }

  pub fn resolved(&self, component: &str) -> Option<&str> {
    self
      .records
      .iter()
      .find(|r| r.component == component)
      .map(|r| r.resolved_version.as_str())
  }
}

/// Regexes for the two assembly attributes
struct VersionMarkers {
  assembly: Regex,
  file: Regex,
}

impl VersionMarkers {
  fn compile() -> ReleaseResult<Self> {
    let compile = |pattern: &str| {
      Regex::new(pattern).map_err(|e| ReleaseError::message(format!("Invalid version marker pattern: {}", e)))
    };
    Ok(Self {
      assembly: compile(ASSEMBLY_VERSION)?,
      file: compile(ASSEMBLY_FILE_VERSION)?,
    })
  }

  fn current(&self, content: &str) -> Option<String> {
    self.assembly.captures(content).map(|caps| caps[2].to_string())
  }

  /// Replace both markers, keeping every other byte
  fn rewrite(&self, content: &str, version: &str) -> String {
    let replace = |caps: &Captures| format!("{}{}{}", &caps[1], version, &caps[3]);
    let content = self.assembly.replace_all(content, replace);
    self.file.replace_all(&content, replace).into_owned()
  }
}

/// Resolves and writes component versions
pub struct VersionStamper<'a> {
  history: &'a dyn CommitHistory,
  markers: VersionMarkers,
  dry_run: bool,
}

impl<'a> VersionStamper<'a> {
  pub fn new(history: &'a dyn CommitHistory) -> ReleaseResult<Self> {
    Ok(Self {
      history,
      markers: VersionMarkers::compile()?,
      dry_run: false,
    })
  }

  /// Resolve versions without touching any file
  pub fn dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Stamp every component; a failing component does not stop the others
  pub fn stamp_all(&self, manifest: &VersionManifest) -> StampReport {
    let mut report = StampReport::default();

    for entry in manifest.entries() {
      match self.stamp(entry) {
        Ok(record) => report.records.push(record),
        Err(err) => {
          tracing::warn!(component = %entry.component, error = %err, "version not updated");
          report.failures.push((entry.component.clone(), err));
        }
      }
    }

    report
  }

  /// Stamp one component
  pub fn stamp(&self, entry: &ManifestEntry) -> ReleaseResult<VersionRecord> {
    let commits_since_tag = self
      .history
      .commits_since(&entry.last_tag, &entry.path)
      .map_err(|e| {
        ReleaseError::Version(VersionError::History {
          component: entry.component.clone(),
          reason: e.to_string(),
        })
      })?;

    let resolved_version = entry.render(commits_since_tag);
    let content = read_version_file(entry)?;
    let previous_version = self.markers.current(&content).ok_or_else(|| marker_not_found(entry))?;

    tracing::debug!(
      component = %entry.component,
      commits_since_tag,
      previous = %previous_version,
      resolved = %resolved_version,
      "resolved version"
    );

    if previous_version != resolved_version && !self.dry_run {
      let updated = self.markers.rewrite(&content, &resolved_version);
      replace_file(&entry.version_file, &updated).map_err(|e| {
        ReleaseError::Version(VersionError::File {
          component: entry.component.clone(),
          file: entry.version_file.clone(),
          reason: e.to_string(),
        })
      })?;
    }

    Ok(VersionRecord {
      component: entry.component.clone(),
      last_tag: entry.last_tag.clone(),
      version_template: entry.version_template.clone(),
      commits_since_tag,
      previous_version,
      resolved_version,
      version_file: entry.version_file.clone(),
    })
  }
}

/// Version currently embedded for `entry`, without querying history
pub fn current_version(entry: &ManifestEntry) -> ReleaseResult<String> {
  let markers = VersionMarkers::compile()?;
  let content = read_version_file(entry)?;
  markers.current(&content).ok_or_else(|| marker_not_found(entry))
}

fn read_version_file(entry: &ManifestEntry) -> ReleaseResult<String> {
  fs::read_to_string(&entry.version_file).map_err(|e| {
    ReleaseError::Version(VersionError::File {
      component: entry.component.clone(),
      file: entry.version_file.clone(),
      reason: e.to_string(),
    })
  })
}

fn marker_not_found(entry: &ManifestEntry) -> ReleaseError {
  ReleaseError::Version(VersionError::MarkerNotFound {
    component: entry.component.clone(),
    file: entry.version_file.clone(),
  })
}

/// Write `content` next to `path`, then rename over it
pub(crate) fn replace_file(path: &Path, content: &str) -> std::io::Result<()> {
  let mut tmp_name = path.as_os_str().to_owned();
  tmp_name.push(".tmp");
  let tmp_path = PathBuf::from(tmp_name);

  if let Err(e) = fs::write(&tmp_path, content) {
    let _ = fs::remove_file(&tmp_path);
    return Err(e);
  }
  fs::rename(&tmp_path, path)
}
