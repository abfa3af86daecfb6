//! Utility functions for cross-platform path handling

use std::path::{Component, Path};

/// Convert a path to Git format (always forward slashes)
///
/// Git expects paths with forward slashes, even on Windows.
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}

/// Split a relative path into its normal segments
///
/// `.` components are dropped; archive paths never carry `..` or roots.
pub fn path_segments(path: &Path) -> Vec<String> {
  path
    .components()
    .filter_map(|c| match c {
      Component::Normal(s) => Some(s.to_string_lossy().to_string()),
      _ => None,
    })
    .collect()
}

/// Join segments into an archive entry name (forward slashes on every host)
pub fn archive_name(segments: &[String]) -> String {
  segments.join("/")
}
