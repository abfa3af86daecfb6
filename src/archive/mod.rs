//! Release packaging
//!
//! - **layout**: which build outputs go into the archive, and under what path
//! - **assembler**: deterministic ZIP writing with a SHA-256 report
//! - **installers**: publish per-architecture installers beside the archive

pub mod assembler;
pub mod installers;
pub mod layout;

pub use assembler::ArchiveAssembler;
pub use installers::{InstallerCopy, copy_installers, installer_copies};
pub use layout::release_layout;
