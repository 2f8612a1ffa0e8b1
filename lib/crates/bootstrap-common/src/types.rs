use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout shared by log lines and result records (UTC, millis).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Level attached to the final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultLevel {
    /// Successful runs are reported at debug level.
    Debug,
    /// Failed runs are reported at warning level.
    Warn,
}

impl std::fmt::Display for ResultLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Debug => "DEBUG",
            Self::Warn => "WARN",
        })
    }
}

/// The single structured record emitted when a run finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: String,
    pub level: ResultLevel,
    pub message: String,
    pub details: String,
}

impl ResultRecord {
    #[must_use]
    pub fn new(level: ResultLevel, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::at(Utc::now(), level, message, details)
    }

    #[must_use]
    pub fn at(
        time: DateTime<Utc>,
        level: ResultLevel,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: time.format(TIMESTAMP_FORMAT).to_string(),
            level,
            message: message.into(),
            details: details.into(),
        }
    }
}
