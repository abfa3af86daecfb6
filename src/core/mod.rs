//! Core building blocks shared by every command
//!
//! - **config**: `release.toml` parsing and validation
//! - **context**: one-time bootstrap (root, config, toolchain)
//! - **error**: error types with exit codes and contextual help messages
//! - **options**: the build option set and its normalisation rules
//! - **vcs**: read-only git history queries (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod options;
pub mod vcs;
