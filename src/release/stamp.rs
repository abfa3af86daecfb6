//! Release stamps
//!
//! A stamp distinguishes one release's files from another's: either the local
//! build time (`M-D-YYYY_hh-MMAM`) or the primary component's version.

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt;

/// Month and day unpadded, 12-hour clock
const TIMESTAMP_FORMAT: &str = "%-m-%-d-%Y_%I-%M%p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ReleaseStamp {
  Timestamp(String),
  Version(String),
}

impl ReleaseStamp {
  pub fn now() -> Self {
    Self::timestamp_at(&Local::now())
  }

  pub fn timestamp_at<Tz>(time: &DateTime<Tz>) -> Self
  where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
  {
    ReleaseStamp::Timestamp(time.format(TIMESTAMP_FORMAT).to_string())
  }

  pub fn version(version: impl Into<String>) -> Self {
    ReleaseStamp::Version(version.into())
  }

  pub fn as_str(&self) -> &str {
    match self {
      ReleaseStamp::Timestamp(s) | ReleaseStamp::Version(s) => s,
    }
  }

  /// `<prefix>_<stamp>.zip`
  pub fn archive_file_name(&self, prefix: &str) -> String {
    format!("{}_{}.zip", prefix, self)
  }
}

impl fmt::Display for ReleaseStamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
