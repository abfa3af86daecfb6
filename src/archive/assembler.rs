//! Deterministic ZIP assembly
//!
//! Entries are collected into a sorted map before anything is written, every
//! entry carries the same timestamp and permissions, and the archive is
//! written beside its destination and renamed into place once complete.
//! Identical inputs therefore give byte-identical archives.

use super::layout::ArchiveLayoutRule;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::ui::progress::ArchiveProgress;
use crate::utils::{archive_name, path_segments};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archive path of the licence file
pub const LICENSE_ENTRY: &str = "LICENSE";

const ENTRY_PERMISSIONS: u32 = 0o644;

/// A finished archive
#[derive(Debug, Clone, Serialize)]
pub struct AssembledArchive {
  pub path: PathBuf,
  /// Archive entry names, sorted
  pub entries: Vec<String>,
  /// Hex SHA-256 of the archive file
  pub sha256: String,
  pub compression: String,
}

/// Builds a release archive from layout rules
pub struct ArchiveAssembler<'a> {
  root: &'a Path,
  show_progress: bool,
}

impl<'a> ArchiveAssembler<'a> {
  pub fn new(root: &'a Path) -> Self {
    Self {
      root,
      show_progress: false,
    }
  }

  pub fn show_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Map of archive entry name to source file
  ///
  /// Later rules overwrite earlier entries with the same archive name.
  /// Missing source directories contribute nothing.
  pub fn collect(&self, rules: &[ArchiveLayoutRule]) -> ReleaseResult<BTreeMap<String, PathBuf>> {
    let mut entries = BTreeMap::new();

    for rule in rules {
      let source = self.root.join(&rule.source_dir);
      if !source.is_dir() {
        tracing::warn!(dir = %source.display(), "archive source directory missing, skipping");
        continue;
      }

      for entry in WalkDir::new(&source).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
          continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        if !rule.filter.accepts(&file_name) {
          tracing::debug!(file = %entry.path().display(), "excluded from archive");
          continue;
        }

        let relative = entry.path().strip_prefix(self.root)?;
        if let Some(segments) = rule.transform.apply(&path_segments(relative)) {
          entries.insert(archive_name(&segments), entry.path().to_path_buf());
        }
      }
    }

    Ok(entries)
  }

  /// Write the archive for `rules` to `archive_path`, with `license` as `LICENSE`
  pub fn assemble(
    &self,
    rules: &[ArchiveLayoutRule],
    archive_path: &Path,
    license: &Path,
  ) -> ReleaseResult<AssembledArchive> {
    let license = self.root.join(license);
    if !license.is_file() {
      return Err(ReleaseError::with_help(
        format!("Licence file not found: {}", license.display()),
        "Set [archive] license in release.toml to the licence shipped with the binaries",
      ));
    }

    let mut entries = self.collect(rules)?;
    entries.insert(LICENSE_ENTRY.to_string(), license);

    if let Some(parent) = archive_path.parent() {
      fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let compression = probe_compression();
    let options = SimpleFileOptions::default()
      .compression_method(compression)
      .last_modified_time(DateTime::default())
      .unix_permissions(ENTRY_PERMISSIONS);

    let partial = partial_path(archive_path);
    let written = self.write_entries(&partial, &entries, options);
    if let Err(err) = written {
      let _ = fs::remove_file(&partial);
      return Err(err);
    }

    if let Err(err) = fs::rename(&partial, archive_path) {
      let _ = fs::remove_file(&partial);
      return Err(
        ReleaseError::from(err).context(format!("Failed to move archive into place at {}", archive_path.display())),
      );
    }

    let sha256 = sha256_file(archive_path)?;
    tracing::debug!(path = %archive_path.display(), %sha256, entries = entries.len(), "archive written");

    Ok(AssembledArchive {
      path: archive_path.to_path_buf(),
      entries: entries.into_keys().collect(),
      sha256,
      compression: format!("{:?}", compression),
    })
  }

  fn write_entries(
    &self,
    partial: &Path,
    entries: &BTreeMap<String, PathBuf>,
    options: SimpleFileOptions,
  ) -> ReleaseResult<()> {
    let file = File::create(partial).with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut writer = ZipWriter::new(file);
    let mut progress = self
      .show_progress
      .then(|| ArchiveProgress::new(entries.len(), "Archiving"));

    for (name, source) in entries {
      writer.start_file(name.as_str(), options)?;
      let mut input = File::open(source).with_context(|| format!("Failed to read {}", source.display()))?;
      io::copy(&mut input, &mut writer)?;

      if let Some(progress) = progress.as_mut() {
        progress.inc();
      }
    }

    let mut file = writer.finish()?;
    file.flush()?;
    Ok(())
  }
}

/// Deflate when this build of the archive writer supports it, otherwise Stored
fn probe_compression() -> CompressionMethod {
  let mut probe = ZipWriter::new(Cursor::new(Vec::new()));
  let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
  match probe.start_file("probe", deflated) {
    Ok(()) => CompressionMethod::Deflated,
    Err(err) => {
      tracing::debug!(%err, "deflate unavailable, storing entries uncompressed");
      CompressionMethod::Stored
    }
  }
}

fn partial_path(archive_path: &Path) -> PathBuf {
  let mut name = archive_path.as_os_str().to_os_string();
  name.push(".partial");
  PathBuf::from(name)
}

pub fn sha256_file(path: &Path) -> ReleaseResult<String> {
  let mut hasher = Sha256::new();
  let mut file = File::open(path).with_context(|| format!("Failed to read {}", path.display()))?;
  io::copy(&mut file, &mut hasher)?;
  Ok(format!("{:x}", hasher.finalize()))
}
