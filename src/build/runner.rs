//! Sequential toolchain invocation
//!
//! Invocations never overlap: the toolchain writes into shared output
//! directories and is not safe to run twice against the same solution. The
//! first failing invocation stops the run.

use super::targets::TargetSpec;
use crate::core::error::{BuildError, ReleaseError, ReleaseResult};
use crate::toolchain::ToolchainHandle;
use std::path::Path;
use std::process::Command;

/// Runs an external program and reports its exit code
pub trait ToolInvoker {
  fn invoke(&mut self, program: &Path, args: &[String]) -> ReleaseResult<i32>;
}

/// Spawns the toolchain as a child process and waits for it
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
  fn invoke(&mut self, program: &Path, args: &[String]) -> ReleaseResult<i32> {
    let status = Command::new(program).args(args).status().map_err(|e| {
      ReleaseError::Build(BuildError::Spawn {
        command: render_command(program, args),
        reason: e.to_string(),
      })
    })?;

    // terminated by a signal
    Ok(status.code().unwrap_or(-1))
  }
}

/// Toolchain arguments in fixed order: solution, targets, configuration,
/// platform, framework, then extra properties sorted by key
pub fn build_arguments(spec: &TargetSpec) -> Vec<String> {
  let mut args = vec![
    spec.solution.to_string_lossy().to_string(),
    format!("/t:{}", spec.targets.joined()),
    format!("/p:Configuration={}", spec.configuration),
    format!("/p:Platform={}", spec.platform),
    format!("/p:TargetFrameworkVersion={}", spec.framework),
  ];
  args.extend(spec.extra.iter().map(|(k, v)| format!("/p:{}={}", k, v)));
  args
}

/// Printable command line, quoting arguments that contain spaces
pub fn render_command(program: &Path, args: &[String]) -> String {
  std::iter::once(program.to_string_lossy().to_string())
    .chain(args.iter().cloned())
    .map(|arg| if arg.contains(' ') { format!("\"{}\"", arg) } else { arg })
    .collect::<Vec<_>>()
    .join(" ")
}

/// Clean invocations for `specs`, one per distinct solution/configuration/platform
pub fn clean_specs(specs: &[TargetSpec]) -> Vec<TargetSpec> {
  let mut cleans: Vec<TargetSpec> = Vec::new();
  for spec in specs {
    let clean = spec.as_clean();
    if !cleans.contains(&clean) {
      cleans.push(clean);
    }
  }
  cleans
}

/// Executes target specs against one toolchain
pub struct BuildRunner<'a> {
  toolchain: &'a ToolchainHandle,
  invoker: &'a mut dyn ToolInvoker,
  dry_run: bool,
}

impl<'a> BuildRunner<'a> {
  pub fn new(toolchain: &'a ToolchainHandle, invoker: &'a mut dyn ToolInvoker) -> Self {
    Self {
      toolchain,
      invoker,
      dry_run: false,
    }
  }

  /// Print invocations instead of running them
  pub fn dry_run(mut self, dry_run: bool) -> Self {
    self.dry_run = dry_run;
    self
  }

  /// Run one invocation; a nonzero exit is a `BuildFailed`
  pub fn run(&mut self, spec: &TargetSpec) -> ReleaseResult<()> {
    let args = build_arguments(spec);
    let command = render_command(&self.toolchain.executable, &args);

    if self.dry_run {
      println!("  {}", command);
      return Ok(());
    }

    println!("🔨 {} {} [{}]", spec.configuration, spec.platform, spec.targets.joined());
    tracing::debug!(%command, "invoking toolchain");

    let exit_code = self.invoker.invoke(&self.toolchain.executable, &args)?;
    if exit_code != 0 {
      return Err(ReleaseError::Build(BuildError::Failed { command, exit_code }));
    }

    Ok(())
  }

  /// Run invocations in order, stopping at the first failure
  ///
  /// Returns the number of invocations that completed.
  pub fn run_all(&mut self, specs: &[TargetSpec]) -> ReleaseResult<usize> {
    for (done, spec) in specs.iter().enumerate() {
      if let Err(err) = self.run(spec) {
        tracing::debug!(completed = done, remaining = specs.len() - done - 1, "build halted");
        return Err(err);
      }
    }
    Ok(specs.len())
  }
}
