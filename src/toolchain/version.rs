use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// `major.minor.build.revision`; missing trailing parts are zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ToolchainVersion {
  pub major: u32,
  pub minor: u32,
  pub build: u32,
  pub revision: u32,
}

impl ToolchainVersion {
  pub const fn new(major: u32, minor: u32) -> Self {
    Self {
      major,
      minor,
      build: 0,
      revision: 0,
    }
  }

  /// Extract the version from a runtime banner
  ///
  /// `Mono JIT compiler version 6.8.0.105 (tarball Tue Feb  4 21:20:35 UTC 2020)`
  pub fn from_banner(banner: &str) -> Option<Self> {
    let first_line = banner.lines().next()?;
    let mut words = first_line.split_whitespace();
    words.find(|w| w.eq_ignore_ascii_case("version"))?;
    words.next()?.parse().ok()
  }
}

impl FromStr for ToolchainVersion {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let parts: Vec<&str> = s.trim().split('.').collect();
    if parts.is_empty() || parts.len() > 4 || parts.iter().any(|p| p.is_empty()) {
      return Err(format!("invalid version '{}'", s));
    }

    let mut numbers = [0u32; 4];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
      *slot = part.parse().map_err(|_| format!("invalid version '{}'", s))?;
    }

    Ok(Self {
      major: numbers[0],
      minor: numbers[1],
      build: numbers[2],
      revision: numbers[3],
    })
  }
}

impl fmt::Display for ToolchainVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
  }
}
