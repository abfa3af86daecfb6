//! Build and release pipeline
//!
//! versions -> release stamp -> target resolution -> (clean) -> build -> archive -> installers
//!
//! Every phase after bootstrap runs in order and the first fatal error stops
//! the pipeline. `--dry-run` prints what would run; `--json` prints the
//! resolved plan as JSON. Neither builds nor writes anything.

use crate::archive::{ArchiveAssembler, InstallerCopy, copy_installers, installer_copies, release_layout};
use crate::build::runner::{build_arguments, clean_specs, render_command};
use crate::build::{BuildRunner, ProcessInvoker, TargetSelector, TargetSpec, ToolInvoker};
use crate::commands::versions::{release_version, update_versions};
use crate::core::config::StampStyle;
use crate::core::context::BuildContext;
use crate::core::error::ReleaseResult;
use crate::core::options::BuildOptionSet;
use crate::release::ReleaseStamp;
use crate::toolchain::ToolchainHandle;
use crate::version::{StampReport, VersionRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Everything the pipeline will do, resolved up front
#[derive(Debug, Serialize)]
pub struct BuildPlan {
  pub toolchain: ToolchainHandle,
  pub options: BuildOptionSet,
  pub framework: String,
  pub stamp: ReleaseStamp,
  pub versions: Vec<VersionRecord>,
  pub version_failures: BTreeMap<String, String>,
  pub clean: Vec<Invocation>,
  pub invocations: Vec<Invocation>,
  pub archive: Option<ArchivePlan>,
  pub installers: Vec<InstallerCopy>,
}

#[derive(Debug, Serialize)]
pub struct Invocation {
  pub command: String,
  #[serde(flatten)]
  pub spec: TargetSpec,
}

#[derive(Debug, Serialize)]
pub struct ArchivePlan {
  pub path: PathBuf,
  pub sources: Vec<PathBuf>,
  pub license: PathBuf,
}

/// Run the build command against the real toolchain
pub fn run_build(ctx: &BuildContext, options: BuildOptionSet, json: bool) -> ReleaseResult<()> {
  let mut invoker = ProcessInvoker;
  run_pipeline(ctx, options, json, &mut invoker)
}

/// Run the pipeline with `invoker` standing in for process execution
pub fn run_pipeline(
  ctx: &BuildContext,
  options: BuildOptionSet,
  json: bool,
  invoker: &mut dyn ToolInvoker,
) -> ReleaseResult<()> {
  let options = options.normalize();
  options.validate()?;

  let preview = json || options.dry_run;

  let report = if options.update_versions {
    Some(update_versions(ctx, preview, json)?)
  } else {
    None
  };

  let plan = resolve_plan(ctx, options, report)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&plan)?);
    return Ok(());
  }

  let mut runner = BuildRunner::new(&ctx.toolchain, invoker).dry_run(plan.options.dry_run);

  if plan.options.dry_run {
    println!("🔍 Dry run - nothing will be built or written");
    println!();
    println!("Toolchain: {}", plan.toolchain);
    println!("Framework: {}", plan.framework);
    println!("Release stamp: {}", plan.stamp);
    println!();
    if !plan.clean.is_empty() {
      println!("Clean:");
      runner.run_all(&specs_of(&plan.clean))?;
    }
    println!("Build:");
    runner.run_all(&specs_of(&plan.invocations))?;
    print_release_preview(&plan);
    return Ok(());
  }

  println!("🔧 Toolchain: {}", plan.toolchain);
  println!("🏷️  Release stamp: {}", plan.stamp);
  println!();

  if !plan.clean.is_empty() {
    println!("🧹 Cleaning");
    runner.run_all(&specs_of(&plan.clean))?;
  }

  let built = runner.run_all(&specs_of(&plan.invocations))?;
  println!("✅ {} build invocation(s) succeeded", built);

  if let Some(archive) = &plan.archive {
    let rules = release_layout(&ctx.config, &plan.options)?;
    let assembled = ArchiveAssembler::new(&ctx.root)
      .show_progress(std::io::stderr().is_terminal())
      .assemble(&rules, &archive.path, &archive.license)?;

    println!();
    println!("📦 {} ({} entries)", assembled.path.display(), assembled.entries.len());
    println!("   sha256: {}", assembled.sha256);

    if !plan.installers.is_empty() {
      copy_installers(&plan.installers)?;
    }
  }

  Ok(())
}

/// Resolve every phase without running anything
pub fn resolve_plan(ctx: &BuildContext, options: BuildOptionSet, report: Option<StampReport>) -> ReleaseResult<BuildPlan> {
  let version = release_version(ctx, report.as_ref())?;

  let stamp = match (&ctx.config.release.stamp, &version) {
    (StampStyle::Version, Some(version)) => ReleaseStamp::version(version),
    _ => ReleaseStamp::now(),
  };

  let selector = TargetSelector::new(&ctx.root, &ctx.config);
  let framework = selector.framework(&options, &ctx.toolchain).to_string();
  let specs = selector.resolve(&options, &ctx.toolchain, version.as_deref());

  let clean = if options.clean { clean_specs(&specs) } else { Vec::new() };

  let release_dir = ctx.root.join(&options.release_dir);

  let (archive, installers) = if options.make_release {
    let sources = release_layout(&ctx.config, &options)?
      .into_iter()
      .map(|rule| rule.source_dir)
      .collect();
    let archive = ArchivePlan {
      path: release_dir.join(stamp.archive_file_name(&ctx.config.archive.name_prefix)),
      sources,
      license: ctx.config.archive.license.clone(),
    };

    let installers = if ctx.toolchain.host.supports_installer() && options.build_editor && options.build_installer {
      installer_copies(&ctx.root, &ctx.config, &release_dir, stamp.as_str())
    } else {
      Vec::new()
    };

    (Some(archive), installers)
  } else {
    (None, Vec::new())
  };

  let (versions, version_failures) = match report {
    Some(report) => (
      report.records,
      report
        .failures
        .into_iter()
        .map(|(component, err)| (component, err.to_string()))
        .collect(),
    ),
    None => (Vec::new(), BTreeMap::new()),
  };

  Ok(BuildPlan {
    toolchain: ctx.toolchain.clone(),
    framework,
    stamp,
    versions,
    version_failures,
    clean: clean.into_iter().map(|spec| invocation(&ctx.toolchain, spec)).collect(),
    invocations: specs.into_iter().map(|spec| invocation(&ctx.toolchain, spec)).collect(),
    archive,
    installers,
    options,
  })
}

fn invocation(toolchain: &ToolchainHandle, spec: TargetSpec) -> Invocation {
  Invocation {
    command: render_command(&toolchain.executable, &build_arguments(&spec)),
    spec,
  }
}

fn specs_of(invocations: &[Invocation]) -> Vec<TargetSpec> {
  invocations.iter().map(|i| i.spec.clone()).collect()
}

fn print_release_preview(plan: &BuildPlan) {
  if let Some(archive) = &plan.archive {
    println!();
    println!("Archive: {}", archive.path.display());
    for source in &archive.sources {
      println!("  + {}", source.display());
    }
    println!("  + {} (as LICENSE)", archive.license.display());
  }

  for copy in &plan.installers {
    println!("Installer: {} -> {}", copy.source.display(), copy.destination.display());
  }
}
