mod archive;
mod build;
mod commands;
mod core;
mod release;
mod toolchain;
mod ui;
mod utils;
mod version;

use clap::Parser;
use core::context::BuildContext;
use core::error::{ReleaseError, print_error};
use core::options::{BuildOptionSet, DEFAULT_RELEASE_DIR};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Build the solution with MSBuild/xbuild and package binary releases
#[derive(Parser)]
#[command(name = "sln-release")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  // ============================================================================
  // Configurations
  // ============================================================================
  /// Only build the Release configuration
  #[arg(long)]
  only_release: bool,

  /// Only build the Debug configuration
  #[arg(long)]
  only_debug: bool,

  // ============================================================================
  // Projects
  // ============================================================================
  /// Only build the core library (implies every --no-* flag)
  #[arg(long)]
  only_core_library: bool,

  /// Do not build the command-line compiler
  #[arg(long)]
  no_cmd_tool: bool,

  /// Do not build the library data scraping tool
  #[arg(long)]
  no_scraping_tool: bool,

  /// Do not build the demo area
  #[arg(long)]
  no_demo_area: bool,

  /// Do not build the editor installer (Windows only)
  #[arg(long)]
  no_installer: bool,

  /// Do not build the editor front-end (Windows only)
  #[arg(long)]
  no_editor_frontend: bool,

  // ============================================================================
  // Release
  // ============================================================================
  /// Package a stamped binary release archive (and installers on Windows)
  #[arg(long)]
  make_release: bool,

  /// Directory release artifacts are written to [default: BinaryRelease]
  #[arg(long)]
  release_dir: Option<PathBuf>,

  /// Run a Clean pass before building
  #[arg(long)]
  clean: bool,

  /// Rewrite embedded versions from tag distance before building
  #[arg(long)]
  update_versions: bool,

  /// Target the newer framework even where the legacy one would be chosen
  #[arg(long)]
  force_newer_framework: bool,

  // ============================================================================
  // Output
  // ============================================================================
  /// Print the toolchain commands instead of running them
  #[arg(long)]
  dry_run: bool,

  /// Print the resolved plan as JSON and exit (useful for CI/automation)
  #[arg(long)]
  json: bool,

  /// Project root (default: current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Enable debug logging (RUST_LOG overrides)
  #[arg(short, long)]
  verbose: bool,
}

impl Cli {
  fn options(&self) -> BuildOptionSet {
    BuildOptionSet {
      release_only: self.only_release,
      debug_only: self.only_debug,
      only_core_library: self.only_core_library,
      build_cmd_tool: !self.no_cmd_tool,
      build_scraping_tool: !self.no_scraping_tool,
      build_demo_area: !self.no_demo_area,
      build_editor: !self.no_editor_frontend,
      build_installer: !self.no_installer,
      make_release: self.make_release,
      release_dir: self.release_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_RELEASE_DIR)),
      clean: self.clean,
      update_versions: self.update_versions,
      force_newer_framework: self.force_newer_framework,
      dry_run: self.dry_run,
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  // option conflicts fail before anything touches the host
  let mut options = cli.options().normalize();
  if let Err(err) = options.validate() {
    handle_error(err);
  }

  let root = match cli.root.clone().map(Ok).unwrap_or_else(std::env::current_dir) {
    Ok(dir) => dir,
    Err(e) => handle_error(ReleaseError::message(format!("Failed to get current directory: {}", e))),
  };

  let probe = toolchain::SystemProbe;
  let ctx = match BuildContext::bootstrap(&root, &probe, BuildContext::toolchain_override_from_env()) {
    Ok(ctx) => ctx,
    Err(err) => handle_error(err),
  };

  if cli.release_dir.is_none()
    && let Some(dir) = &ctx.config.release.dir
  {
    options.release_dir = dir.clone();
  }

  if let Err(err) = commands::run_build(&ctx, options, cli.json) {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
