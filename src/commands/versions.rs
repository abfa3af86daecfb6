//! Version update step
//!
//! Runs before any build so the binaries carry the freshly derived versions.

use crate::core::config::StampStyle;
use crate::core::context::BuildContext;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use crate::version::{StampReport, VersionManifest, VersionStamper, current_version};

/// Stamp every manifest component; with `dry_run` nothing is written
///
/// Per-component failures are reported and left in the report, they do not
/// fail the step. A missing or malformed manifest does.
pub fn update_versions(ctx: &BuildContext, dry_run: bool, quiet: bool) -> ReleaseResult<StampReport> {
  let manifest = VersionManifest::load(&ctx.root, &ctx.config.versions)?;
  if manifest.is_empty() {
    tracing::warn!("version manifest lists no components");
  }
  tracing::debug!(components = manifest.len(), "loaded version manifest");

  let git = SystemGit::open(&ctx.root)?;
  let report = VersionStamper::new(&git)?.dry_run(dry_run).stamp_all(&manifest);

  if !quiet {
    print_report(&report, dry_run);
  }

  Ok(report)
}

/// Version of the primary component: freshly resolved if a stamp ran, else embedded
pub fn primary_version(ctx: &BuildContext, report: Option<&StampReport>) -> ReleaseResult<String> {
  let component = ctx.config.primary_component();

  if let Some(version) = report.and_then(|r| r.resolved(component)) {
    return Ok(version.to_string());
  }

  let manifest = VersionManifest::load(&ctx.root, &ctx.config.versions)?;
  current_version(manifest.get(component)?)
}

/// Primary version, required only when it names the release
pub fn release_version(ctx: &BuildContext, report: Option<&StampReport>) -> ReleaseResult<Option<String>> {
  match primary_version(ctx, report) {
    Ok(version) => Ok(Some(version)),
    Err(err) if ctx.config.release.stamp == StampStyle::Version => {
      Err(err.context("Release stamp is \"version\" but the primary component version is unavailable"))
    }
    Err(err) => {
      tracing::debug!(error = %err, "primary component version unavailable");
      Ok(None)
    }
  }
}

fn print_report(report: &StampReport, dry_run: bool) {
  let verb = if dry_run { "would update" } else { "updated" };

  println!("🏷️  Versions");
  for record in &report.records {
    if record.changed() {
      println!(
        "   📝 {}: {} -> {} ({}, {} commits since {})",
        record.component,
        record.previous_version,
        record.resolved_version,
        verb,
        record.commits_since_tag,
        record.last_tag
      );
    } else {
      println!("   ✓ {}: {} (unchanged)", record.component, record.resolved_version);
    }
  }
  for (component, err) in &report.failures {
    println!("   ⚠️  {}: {}", component, err);
  }
  println!("   {} {} version(s)", verb, report.changes().len());
  println!();
}
