pub mod system_git;

pub use system_git::SystemGit;

use crate::core::error::ReleaseResult;
use std::path::Path;

/// Read-only view of source control history
pub trait CommitHistory {
  /// Commits reachable from HEAD but not from `tag`, limited to `path`
  fn commits_since(&self, tag: &str, path: &Path) -> ReleaseResult<u64>;
}
