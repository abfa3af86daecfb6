//! Archive layout rules
//!
//! A rule names a source directory (relative to the project root), a
//! transform from its files' root-relative paths to archive paths, and a
//! filter deciding which files are archived at all.

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::options::BuildOptionSet;
use glob::Pattern;
use std::path::PathBuf;

/// Rewrites a root-relative path (as segments) into an archive path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTransform {
  Identity,
  /// Remove the n-th segment (0-based); paths shorter than that pass through
  DropSegment(usize),
  /// Place the path under `dir`
  Prefix(PathBuf),
}

impl PathTransform {
  /// `None` when nothing is left to name the entry
  pub fn apply(&self, segments: &[String]) -> Option<Vec<String>> {
    let mut out = segments.to_vec();
    match self {
      PathTransform::Identity => {}
      PathTransform::DropSegment(n) => {
        if *n < out.len() {
          out.remove(*n);
        }
      }
      PathTransform::Prefix(dir) => {
        let mut prefixed = crate::utils::path_segments(dir);
        prefixed.extend(out);
        out = prefixed;
      }
    }
    if out.is_empty() { None } else { Some(out) }
  }
}

/// Excludes files whose name matches any glob
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
  exclude: Vec<Pattern>,
}

impl FileFilter {
  pub fn from_patterns(patterns: &[String]) -> ReleaseResult<Self> {
    let exclude = patterns.iter().map(|p| Pattern::new(p)).collect::<Result<Vec<_>, _>>()?;
    Ok(Self { exclude })
  }

  pub fn accepts(&self, file_name: &str) -> bool {
    !self.exclude.iter().any(|p| p.matches(file_name))
  }
}

#[derive(Debug, Clone)]
pub struct ArchiveLayoutRule {
  pub source_dir: PathBuf,
  pub transform: PathTransform,
  pub filter: FileFilter,
}

impl ArchiveLayoutRule {
  pub fn new(source_dir: impl Into<PathBuf>, transform: PathTransform, filter: FileFilter) -> Self {
    Self {
      source_dir: source_dir.into(),
      transform,
      filter,
    }
  }
}

/// Rules for the binary release archive
///
/// Only output of configurations that were actually built is included. The
/// `bin` segment is dropped so `LibLSLCC/bin/AnyCPU/Release/x.dll` lands at
/// `LibLSLCC/AnyCPU/Release/x.dll`.
pub fn release_layout(config: &ReleaseConfig, options: &BuildOptionSet) -> ReleaseResult<Vec<ArchiveLayoutRule>> {
  let filter = FileFilter::from_patterns(&config.archive.exclude)?;
  let library = PathBuf::from(&config.projects.core_library).join("bin");
  let cmd_tool = PathBuf::from(&config.projects.cmd_tool).join("bin");

  let mut sources = Vec::new();
  if options.builds_release() {
    sources.push(library.join("AnyCPU").join("Release"));
  }
  if options.builds_debug() {
    sources.push(library.join("AnyCPU").join("Debug"));
  }
  sources.push(library.join("ThirdPartyLicenses"));
  if options.build_cmd_tool && options.builds_release() {
    sources.push(cmd_tool.join("AnyCPU").join("Release"));
  }

  Ok(
    sources
      .into_iter()
      .map(|dir| ArchiveLayoutRule::new(dir, PathTransform::DropSegment(1), filter.clone()))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn segments(path: &str) -> Vec<String> {
    path.split('/').map(str::to_string).collect()
  }

  #[test]
  fn test_drop_segment_removes_bin() {
    let out = PathTransform::DropSegment(1).apply(&segments("ComponentA/bin/AnyCPU/Release/x.dll"));
    assert_eq!(out, Some(segments("ComponentA/AnyCPU/Release/x.dll")));
  }

  #[test]
  fn test_drop_segment_past_end_is_identity() {
    let out = PathTransform::DropSegment(5).apply(&segments("a/b"));
    assert_eq!(out, Some(segments("a/b")));
  }

  #[test]
  fn test_drop_only_segment_yields_nothing() {
    assert_eq!(PathTransform::DropSegment(0).apply(&segments("x.dll")), None);
  }

  #[test]
  fn test_prefix() {
    let out = PathTransform::Prefix(PathBuf::from("pkg/lib")).apply(&segments("x.dll"));
    assert_eq!(out, Some(segments("pkg/lib/x.dll")));
  }

  #[test]
  fn test_filter_default_excludes() {
    let filter = FileFilter::from_patterns(&ReleaseConfig::default().archive.exclude).unwrap();
    assert!(filter.accepts("LibLSLCC.dll"));
    assert!(!filter.accepts("build.tmp"));
    assert!(!filter.accepts("lslcc.vshost.exe"));
    assert!(!filter.accepts("notes.txt~"));
  }

  #[test]
  fn test_release_only_layout_has_no_debug_output() {
    let options = BuildOptionSet {
      release_only: true,
      make_release: true,
      ..Default::default()
    }
    .normalize();
    let rules = release_layout(&ReleaseConfig::default(), &options).unwrap();
    let dirs: Vec<_> = rules.iter().map(|r| r.source_dir.clone()).collect();

    assert_eq!(
      dirs,
      vec![
        PathBuf::from("LibLSLCC/bin/AnyCPU/Release"),
        PathBuf::from("LibLSLCC/bin/ThirdPartyLicenses"),
        PathBuf::from("lslcc_cmd/bin/AnyCPU/Release"),
      ]
    );
  }

  #[test]
  fn test_debug_only_layout_skips_cmd_tool() {
    let options = BuildOptionSet {
      debug_only: true,
      ..Default::default()
    };
    let rules = release_layout(&ReleaseConfig::default(), &options).unwrap();
    assert!(rules.iter().all(|r| !r.source_dir.starts_with("lslcc_cmd")));
    assert!(rules.iter().any(|r| r.source_dir.ends_with("Debug")));
  }
}
