//! CLI command implementations
//!
//! - **build**: the build and release pipeline (targets, toolchain runs, archive, installers)
//! - **versions**: version stamping from tag distance, run ahead of the build
//!
//! Commands accept `&BuildContext` so bootstrap happens exactly once.

pub mod build;
pub mod versions;

pub use build::run_build;
