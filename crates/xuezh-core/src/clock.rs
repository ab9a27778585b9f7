//! UTC clock with a fixed-time override for tests.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::XuezhError;

/// Environment variable pinning the current time (RFC 3339, offset required).
pub const TEST_NOW_ENV: &str = "XUEZH_TEST_NOW_ISO";

/// Source of "now" for artifact names and attempt timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clock {
    fixed: Option<DateTime<Utc>>,
}

impl Clock {
    /// Clock reading the system time.
    pub const fn system() -> Self {
        Self { fixed: None }
    }

    /// Clock frozen at `at`.
    pub const fn fixed(at: DateTime<Utc>) -> Self {
        Self { fixed: Some(at) }
    }

    /// System clock unless `XUEZH_TEST_NOW_ISO` pins a time.
    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self, XuezhError> {
        match env(TEST_NOW_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => Ok(Self::fixed(parse_utc_iso(&value)?)),
            None => Ok(Self::system()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed.unwrap_or_else(Utc::now)
    }
}

/// Parse an offset-qualified timestamp into UTC.
pub fn parse_utc_iso(value: &str) -> Result<DateTime<Utc>, XuezhError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            XuezhError::InvalidArgument(
                "timestamp must be timezone-aware (include +00:00 or Z)".to_string(),
            )
        })
}

/// Format as `YYYY-MM-DDTHH:MM:SS+00:00`, with microseconds only when non-zero.
pub fn format_iso(ts: DateTime<Utc>) -> String {
    if ts.timestamp_subsec_micros() == 0 {
        ts.to_rfc3339_opts(SecondsFormat::Secs, false)
    } else {
        ts.to_rfc3339_opts(SecondsFormat::Micros, false)
    }
}

/// Compact stamp used in artifact file names, e.g. `20250102T030405Z`.
pub fn artifact_stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}
