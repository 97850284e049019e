//! Error facility for calltrail
//!
//! Two layers, mirroring how the facade is used:
//!
//! - [`CalltrailError`]: the domain taxonomy raised by configuration loading,
//!   logger construction and transports.
//! - [`LogError`]: the canonical structured error carrying a stable
//!   [`LogErrorKind`] code plus operation context. Every public fallible API
//!   returns it.
//!
//! Capturing caller context never fails and has no error type.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using LogError
pub type Result<T> = std::result::Result<T, LogError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code usable in tests, CLI output and the
/// `err.code` field of facility events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogErrorKind {
    // Input/Configuration
    InvalidInput,
    InvalidLevel,
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
    Transport,
}

impl LogErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            LogErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            LogErrorKind::InvalidLevel => "ERR_INVALID_LEVEL",
            LogErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            LogErrorKind::Io => "ERR_IO",
            LogErrorKind::Serialization => "ERR_SERIALIZATION",
            LogErrorKind::Transport => "ERR_TRANSPORT",
        }
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct LogError {
    kind: LogErrorKind,
    op: Option<String>,
    path: Option<PathBuf>,
    channel: Option<String>,
    message: String,
}

impl LogError {
    /// Create a new error with the specified kind
    pub fn new(kind: LogErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            channel: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the file the operation was working on
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Add the output channel involved
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> LogErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for LogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        if let Some(channel) = &self.channel {
            write!(f, " (channel: {})", channel)?;
        }
        Ok(())
    }
}

impl std::error::Error for LogError {}

// ========== End Error Facility ==========

/// Domain error taxonomy for calltrail operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalltrailError {
    /// Level name is not one of the eight canonical severities
    #[error("Unknown log level: {name}")]
    UnknownLevel { name: String },

    /// Configuration text is not valid TOML for the logger schema
    #[error("Invalid configuration: {message}")]
    ConfigParse { message: String },

    /// Configuration file could not be read
    #[error("Cannot read configuration {path}: {message}")]
    ConfigRead { path: PathBuf, message: String },

    /// Stream target could not be opened for appending
    #[error("Cannot open stream target {path}: {message}")]
    StreamOpen { path: PathBuf, message: String },

    /// A `KEY=VALUE` context pair was malformed
    #[error("Invalid context pair '{pair}': expected KEY=VALUE")]
    InvalidContextPair { pair: String },

    /// A notification transport rejected a delivery
    #[error("Delivery through {channel} failed: {message}")]
    TransportFailed { channel: String, message: String },

    /// Configuration could not be rendered
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<CalltrailError> for LogError {
    fn from(err: CalltrailError) -> Self {
        match err {
            CalltrailError::UnknownLevel { name } => LogError::new(LogErrorKind::InvalidLevel)
                .with_op("parse_level")
                .with_message(format!("Unknown log level: {}", name)),

            CalltrailError::ConfigParse { message } => LogError::new(LogErrorKind::InvalidConfig)
                .with_op("parse_config")
                .with_message(message),

            CalltrailError::ConfigRead { path, message } => LogError::new(LogErrorKind::Io)
                .with_op("load_config")
                .with_path(path)
                .with_message(message),

            CalltrailError::StreamOpen { path, message } => LogError::new(LogErrorKind::Io)
                .with_op("open_stream")
                .with_path(path)
                .with_message(message),

            CalltrailError::InvalidContextPair { pair } => {
                LogError::new(LogErrorKind::InvalidInput)
                    .with_op("parse_context")
                    .with_message(format!("Invalid context pair '{}'", pair))
            }

            CalltrailError::TransportFailed { channel, message } => {
                LogError::new(LogErrorKind::Transport)
                    .with_op("deliver")
                    .with_channel(channel)
                    .with_message(message)
            }

            CalltrailError::Serialization { message } => {
                LogError::new(LogErrorKind::Serialization)
                    .with_op("render_config")
                    .with_message(message)
            }
        }
    }
}

impl From<toml::ser::Error> for CalltrailError {
    fn from(err: toml::ser::Error) -> Self {
        CalltrailError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for CalltrailError {
    fn from(err: toml::de::Error) -> Self {
        CalltrailError::ConfigParse {
            message: err.to_string(),
        }
    }
}
