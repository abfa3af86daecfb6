//! Build planning and execution
//!
//! - **targets**: resolve build options into [`TargetSpec`] invocations
//! - **runner**: invoke the toolchain for each spec, in order, halting on failure

pub mod runner;
pub mod targets;

pub use runner::{BuildRunner, ProcessInvoker, ToolInvoker};
pub use targets::{Platform, TargetSelector, TargetSpec};
