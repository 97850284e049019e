//! Log severities
//!
//! The facade knows eight levels, ordered by severity. `tracing` only has
//! five, so every level also carries a dedicated event target that lets
//! channel filters tell NOTICE apart from INFO and ALERT apart from ERROR.

use calltrail_errors::CalltrailError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Level {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl Level {
    /// All levels, least severe first
    pub const ALL: [Level; 8] = [
        Level::Debug,
        Level::Info,
        Level::Notice,
        Level::Warning,
        Level::Error,
        Level::Critical,
        Level::Alert,
        Level::Emergency,
    ];

    /// Numeric severity code
    pub fn code(self) -> u16 {
        match self {
            Level::Debug => 100,
            Level::Info => 200,
            Level::Notice => 250,
            Level::Warning => 300,
            Level::Error => 400,
            Level::Critical => 500,
            Level::Alert => 550,
            Level::Emergency => 600,
        }
    }

    /// Upper-case level name
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Notice => "NOTICE",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
            Level::Alert => "ALERT",
            Level::Emergency => "EMERGENCY",
        }
    }

    /// Closest `tracing` level
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info | Level::Notice => tracing::Level::INFO,
            Level::Warning => tracing::Level::WARN,
            Level::Error | Level::Critical | Level::Alert | Level::Emergency => {
                tracing::Level::ERROR
            }
        }
    }

    /// Event target used when a record of this level is emitted
    pub fn target(self) -> &'static str {
        match self {
            Level::Debug => "calltrail::debug",
            Level::Info => "calltrail::info",
            Level::Notice => "calltrail::notice",
            Level::Warning => "calltrail::warning",
            Level::Error => "calltrail::error",
            Level::Critical => "calltrail::critical",
            Level::Alert => "calltrail::alert",
            Level::Emergency => "calltrail::emergency",
        }
    }

    /// Inverse of [`Level::target`]
    pub fn from_target(target: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.target() == target)
    }

    /// Look a level up by its numeric code
    pub fn from_code(code: u16) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.code() == code)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = CalltrailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "notice" => Ok(Level::Notice),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" => Ok(Level::Critical),
            "alert" => Ok(Level::Alert),
            "emergency" => Ok(Level::Emergency),
            _ => Err(CalltrailError::UnknownLevel {
                name: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Level {
    type Error = CalltrailError;

    fn try_from(value: String) -> Result<Self, CalltrailError> {
        value.parse()
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.name().to_ascii_lowercase()
    }
}
