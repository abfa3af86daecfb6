//! Error types for sln-release with contextual messages and exit codes
//!
//! Every failure the pipeline can raise is one of a handful of categories,
//! each with its own fatality policy:
//!
//! - **Toolchain**: no compatible build tool on the host (fatal, pre-build)
//! - **Config**: malformed `release.toml`, manifest or option conflict (fatal, pre-build)
//! - **Version**: one component's version could not be resolved (non-fatal)
//! - **Build**: the toolchain exited nonzero (fatal, halts packaging)
//! - **Artifact**: an installer could not be copied (fatal during packaging)

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for sln-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (git, I/O)
  System = 2,
  /// No usable toolchain
  Toolchain = 4,
  /// External build failed
  Build = 5,
  /// Packaging failed
  Artifact = 6,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for sln-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Toolchain discovery errors
  Toolchain(ToolchainError),

  /// Configuration errors
  Config(ConfigError),

  /// Version resolution errors
  Version(VersionError),

  /// External build errors
  Build(BuildError),

  /// Release artifact errors
  Artifact(ArtifactError),

  /// I/O errors
  Io(io::Error),

  /// Typed error with caller context; exit code and help come from `source`
  Context {
    source: Box<ReleaseError>,
    context: String,
  },

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      ReleaseError::Context { source, context } => ReleaseError::Context {
        source,
        context: format!("{}\n{}", ctx_str, context),
      },
      other => ReleaseError::Context {
        source: Box::new(other),
        context: ctx_str,
      },
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Toolchain(_) => ExitCode::Toolchain,
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Version(_) => ExitCode::System,
      ReleaseError::Build(_) => ExitCode::Build,
      ReleaseError::Artifact(_) => ExitCode::Artifact,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Context { source, .. } => source.exit_code(),
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Toolchain(e) => e.help_message(),
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Artifact(e) => e.help_message(),
      ReleaseError::Context { source, .. } => source.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Toolchain(e) => write!(f, "{}", e),
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Version(e) => write!(f, "{}", e),
      ReleaseError::Build(e) => write!(f, "{}", e),
      ReleaseError::Artifact(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Context { source, context } => write!(f, "{}\n{}", source, context),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::Context { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::Config(ConfigError::Invalid {
      reason: format!("TOML deserialization error: {}", err),
    })
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<zip::result::ZipError> for ReleaseError {
  fn from(err: zip::result::ZipError) -> Self {
    ReleaseError::message(format!("Archive error: {}", err))
  }
}

impl From<walkdir::Error> for ReleaseError {
  fn from(err: walkdir::Error) -> Self {
    ReleaseError::message(format!("Directory walk error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::Config(ConfigError::Invalid {
      reason: format!("Invalid file pattern: {}", err),
    })
  }
}

impl From<std::path::StripPrefixError> for ReleaseError {
  fn from(err: std::path::StripPrefixError) -> Self {
    ReleaseError::message(format!("Path strip prefix error: {}", err))
  }
}

/// No compatible build tool could be found
#[derive(Debug)]
pub enum ToolchainError {
  /// Nothing on the host satisfies the requirement
  NotFound { requirement: String, remediation: String },

  /// Explicitly configured toolchain path does not exist
  OverrideMissing { path: PathBuf },
}

impl ToolchainError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolchainError::NotFound { remediation, .. } => Some(remediation.clone()),
      ToolchainError::OverrideMissing { .. } => Some(
        "Fix `[toolchain] path` in release.toml or unset SLN_RELEASE_TOOLCHAIN to use discovery.".to_string(),
      ),
    }
  }
}

impl fmt::Display for ToolchainError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolchainError::NotFound { requirement, .. } => {
        write!(f, "Toolchain not found: {}", requirement)
      }
      ToolchainError::OverrideMissing { path } => {
        write!(f, "Configured toolchain does not exist: {}", path.display())
      }
    }
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Version manifest not found
  ManifestNotFound { path: PathBuf },

  /// Missing required field
  MissingField { field: String },

  /// Component not present in the version manifest
  ComponentNotFound { name: String },

  /// Two options that cannot be combined
  OptionConflict { first: String, second: String },

  /// Any other malformed input
  Invalid { reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ManifestNotFound { .. } => {
        Some("Create version.json or point `[versions] manifest` in release.toml at it.".to_string())
      }
      ConfigError::ComponentNotFound { name } => Some(format!(
        "Add an entry for '{}' to the version manifest with `last_tag` and `version_template`.",
        name
      )),
      ConfigError::OptionConflict { .. } => {
        Some("Drop one of the flags; omit both to build Debug and Release.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::ManifestNotFound { path } => {
        write!(f, "Version manifest not found: {}", path.display())
      }
      ConfigError::MissingField { field } => {
        write!(f, "Missing required field: {}", field)
      }
      ConfigError::ComponentNotFound { name } => {
        write!(f, "Component '{}' not found in version manifest", name)
      }
      ConfigError::OptionConflict { first, second } => {
        write!(f, "Options {} and {} are mutually exclusive", first, second)
      }
      ConfigError::Invalid { reason } => {
        write!(f, "Invalid configuration: {}", reason)
      }
    }
  }
}

/// Version could not be resolved for one component
#[derive(Debug)]
pub enum VersionError {
  /// Source control query failed (unknown tag, not a repository)
  History { component: String, reason: String },

  /// The embedded version file has no recognisable marker
  MarkerNotFound { component: String, file: PathBuf },

  /// The embedded version file could not be read or replaced
  File {
    component: String,
    file: PathBuf,
    reason: String,
  },
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VersionError::History { component, reason } => {
        write!(f, "Cannot resolve version for {}: {}", component, reason)
      }
      VersionError::MarkerNotFound { component, file } => {
        write!(
          f,
          "Cannot resolve version for {}: no AssemblyVersion marker in {}",
          component,
          file.display()
        )
      }
      VersionError::File { component, file, reason } => {
        write!(
          f,
          "Cannot update version for {}: {} ({})",
          component,
          file.display(),
          reason
        )
      }
    }
  }
}

/// External build failed
#[derive(Debug)]
pub enum BuildError {
  /// Toolchain exited with a nonzero status
  Failed { command: String, exit_code: i32 },

  /// Toolchain process could not be started
  Spawn { command: String, reason: String },
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::Failed { command, exit_code } => {
        write!(f, "Build failed with exit code {}:\n  {}", exit_code, command)
      }
      BuildError::Spawn { command, reason } => {
        write!(f, "Failed to start build tool: {}\n  {}", reason, command)
      }
    }
  }
}

/// Release artifact errors
#[derive(Debug)]
pub enum ArtifactError {
  /// Copying an installer failed
  CopyFailed {
    source: PathBuf,
    destination: PathBuf,
    reason: String,
  },
}

impl ArtifactError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArtifactError::CopyFailed { source, .. } if !source.exists() => Some(
        "The installer was not produced. Check that the installer build was not skipped (--no-installer, --no-editor-frontend).".to_string(),
      ),
      ArtifactError::CopyFailed { .. } => None,
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactError::CopyFailed {
        source,
        destination,
        reason,
      } => write!(
        f,
        "Failed to copy {} -> {}: {}",
        source.display(),
        destination.display(),
        reason
      ),
    }
  }
}

/// Result type alias for sln-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
