//! Version derivation from source control
//!
//! - **manifest**: `version.json` loading and template rendering
//! - **stamper**: resolve versions from tag distance and rewrite the embedded
//!   `AssemblyVersion` / `AssemblyFileVersion` markers

pub mod manifest;
pub mod stamper;

pub use manifest::VersionManifest;
pub use stamper::{StampReport, VersionRecord, VersionStamper, current_version};
