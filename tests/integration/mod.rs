//! Integration tests for sln-release
//!
//! The toolchain is replaced by a shell script, so these run on Unix hosts only.

#![cfg(unix)]

mod helpers;
mod test_build;
mod test_release;
mod test_versions;
