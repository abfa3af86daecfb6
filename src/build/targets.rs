//! Build target resolution
//!
//! Turns a [`BuildOptionSet`] into the ordered list of toolchain invocations.
//! Projects sharing a solution are composed into one target list per
//! configuration, so the number of invocations stays small and the argument
//! lists are identical from run to run.

use crate::core::config::ReleaseConfig;
use crate::core::options::BuildOptionSet;
use crate::toolchain::ToolchainHandle;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Build configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Configuration {
  Debug,
  Release,
}

impl fmt::Display for Configuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Configuration::Debug => write!(f, "Debug"),
      Configuration::Release => write!(f, "Release"),
    }
  }
}

/// Solution platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Platform {
  #[serde(rename = "Any CPU")]
  AnyCpu,
  #[serde(rename = "x86")]
  X86,
  #[serde(rename = "x64")]
  X64,
}

impl Platform {
  /// Directory name the toolchain writes this platform's output to
  pub fn output_dir(self) -> &'static str {
    match self {
      Platform::AnyCpu => "AnyCPU",
      Platform::X86 => "x86",
      Platform::X64 => "x64",
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Platform::AnyCpu => write!(f, "Any CPU"),
      Platform::X86 => write!(f, "x86"),
      Platform::X64 => write!(f, "x64"),
    }
  }
}

/// Ordered, duplicate-free list of target names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetNames(Vec<String>);

impl TargetNames {
  pub fn new(first: impl Into<String>) -> Self {
    Self(vec![first.into()])
  }

  /// Append `name` unless already present; returns whether it was added
  pub fn insert(&mut self, name: impl Into<String>) -> bool {
    let name = name.into();
    if self.0.contains(&name) {
      return false;
    }
    self.0.push(name);
    true
  }

  /// Union, keeping the receiver's order first
  pub fn union(&mut self, other: &TargetNames) {
    for name in &other.0 {
      self.insert(name.clone());
    }
  }

  pub fn contains(&self, name: &str) -> bool {
    self.0.iter().any(|n| n == name)
  }

  /// `a;b;c`, the form the toolchain's `/t:` switch takes
  pub fn joined(&self) -> String {
    self.0.join(";")
  }
}

/// One fully parameterised toolchain invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetSpec {
  pub solution: PathBuf,
  pub targets: TargetNames,
  pub configuration: Configuration,
  pub platform: Platform,
  /// `TargetFrameworkVersion`, e.g. `v4.0`
  pub framework: String,
  pub extra: BTreeMap<String, String>,
}

impl TargetSpec {
  pub fn new(
    solution: impl Into<PathBuf>,
    targets: TargetNames,
    configuration: Configuration,
    platform: Platform,
    framework: impl Into<String>,
  ) -> Self {
    Self {
      solution: solution.into(),
      targets,
      configuration,
      platform,
      framework: framework.into(),
      extra: BTreeMap::new(),
    }
  }

  pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.extra.insert(key.into(), value.into());
    self
  }

  /// Same invocation apart from the target list
  pub fn can_merge(&self, other: &TargetSpec) -> bool {
    self.solution == other.solution
      && self.configuration == other.configuration
      && self.platform == other.platform
      && self.framework == other.framework
      && self.extra == other.extra
  }

  /// The same invocation re-targeted at `Clean`
  pub fn as_clean(&self) -> TargetSpec {
    TargetSpec {
      targets: TargetNames::new("Clean"),
      ..self.clone()
    }
  }
}

/// Add `spec` to `specs`, folding it into an existing compatible invocation
pub fn push_merged(specs: &mut Vec<TargetSpec>, spec: TargetSpec) {
  match specs.iter_mut().find(|s| s.can_merge(&spec)) {
    Some(existing) => existing.targets.union(&spec.targets),
    None => specs.push(spec),
  }
}

/// Resolves options into toolchain invocations
pub struct TargetSelector<'a> {
  root: &'a Path,
  config: &'a ReleaseConfig,
}

impl<'a> TargetSelector<'a> {
  pub fn new(root: &'a Path, config: &'a ReleaseConfig) -> Self {
    Self { root, config }
  }

  /// Target framework for the library solution
  ///
  /// Newer open-source toolchains cannot build the legacy framework, so they
  /// get the newer one even when it was not asked for.
  pub fn framework(&self, options: &BuildOptionSet, toolchain: &ToolchainHandle) -> &'a str {
    let framework = &self.config.framework;
    let runtime_too_new = toolchain.is_open_source()
      && toolchain
        .runtime_major()
        .is_some_and(|major| major > framework.open_source_threshold);

    if options.force_newer_framework || runtime_too_new {
      &framework.newer
    } else {
      &framework.legacy
    }
  }

  /// Resolve the ordered invocation list
  ///
  /// `version` parameterises installer builds when known.
  pub fn resolve(&self, options: &BuildOptionSet, toolchain: &ToolchainHandle, version: Option<&str>) -> Vec<TargetSpec> {
    let projects = &self.config.projects;
    let framework = self.framework(options, toolchain);
    let library_solution = self.root.join(&self.config.solutions.no_editor);
    let editor_solution = self.root.join(&self.config.solutions.with_editor);

    let mut specs = Vec::new();

    for configuration in configurations(options) {
      let mut targets = TargetNames::new(&projects.core_library);

      // only the Release build of the command-line tool ships
      let cmd_tool_wanted = options.build_cmd_tool && !(options.make_release && configuration == Configuration::Debug);
      if cmd_tool_wanted {
        targets.insert(&projects.cmd_tool);
      }
      if options.build_scraping_tool {
        targets.insert(&projects.scraping_tool);
      }
      if options.build_demo_area {
        targets.insert(&projects.demo_area);
      }

      push_merged(
        &mut specs,
        TargetSpec::new(&library_solution, targets, configuration, Platform::AnyCpu, framework),
      );
    }

    if toolchain.host.supports_installer() && options.build_editor {
      let newer = &self.config.framework.newer;

      if options.build_installer {
        for platform in [Platform::X86, Platform::X64] {
          let mut spec = TargetSpec::new(
            &editor_solution,
            TargetNames::new(&projects.installer),
            Configuration::Release,
            platform,
            newer,
          );
          if let Some(version) = version {
            spec = spec.with_property(&self.config.installer.version_property, version);
          }
          push_merged(&mut specs, spec);
        }
      } else {
        for configuration in configurations(options) {
          push_merged(
            &mut specs,
            TargetSpec::new(
              &editor_solution,
              TargetNames::new(&projects.editor),
              configuration,
              Platform::AnyCpu,
              newer,
            ),
          );
        }
      }
    }

    specs
  }
}

fn configurations(options: &BuildOptionSet) -> Vec<Configuration> {
  let mut configurations = Vec::with_capacity(2);
  if options.builds_debug() {
    configurations.push(Configuration::Debug);
  }
  if options.builds_release() {
    configurations.push(Configuration::Release);
  }
  configurations
}
