//! Logger configuration
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! name = "billing"
//!
//! [stream]
//! target = "/var/log/billing.log"
//! threshold = "debug"
//!
//! [mail]
//! recipients = ["ops@example.com"]
//! subject = "Billing alert"
//! sender = "billing@example.com"
//! threshold = "error"
//!
//! [chat]
//! room = "billing-room"
//! token = "..."
//! threshold = "info"
//!
//! [capture]
//! length = 4
//! offset = 0
//! ```

use calltrail_core::{CaptureWindow, Level, WindowLength};
use calltrail_core_types::Sensitive;
use calltrail_errors::{CalltrailError, LogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOGGER_NAME: &str = "Logger";
pub const DEFAULT_STREAM_TARGET: &str = "logger.log";
pub const DEFAULT_MAIL_SUBJECT: &str = "Logger";
pub const DEFAULT_MAIL_SENDER: &str = "logger@example.com";
pub const DEFAULT_CHAT_ROOM: &str = "Logger_Room";

/// Full logger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggerConfig {
    pub name: String,
    pub stream: StreamConfig,
    pub mail: MailConfig,
    pub chat: ChatConfig,
    pub capture: CaptureConfig,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOGGER_NAME.to_string(),
            stream: StreamConfig::default(),
            mail: MailConfig::default(),
            chat: ChatConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for malformed TOML, unknown fields or unknown
    /// level names.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| LogError::from(CalltrailError::from(e)))
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `InvalidConfig` if it does not
    /// parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            LogError::from(CalltrailError::ConfigRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })?;
        Self::from_toml_str(&text).map_err(|e| e.with_path(path))
    }

    /// Render as TOML; the chat token is redacted
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the configuration cannot be encoded.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| LogError::from(CalltrailError::from(e)))
    }

    /// Replace the logger name unless `name` is empty
    pub fn set_name(&mut self, name: &str) {
        if !name.is_empty() {
            self.name = name.to_string();
        }
    }

    /// Replace the stream target unless `target` is empty
    pub fn set_stream_target(&mut self, target: &Path) {
        if !target.as_os_str().is_empty() {
            self.stream.target = target.to_path_buf();
        }
    }
}

/// File stream channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    pub enabled: bool,
    pub target: PathBuf,
    pub threshold: Level,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: PathBuf::from(DEFAULT_STREAM_TARGET),
            threshold: Level::Debug,
        }
    }
}

/// Mail channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MailConfig {
    pub enabled: bool,
    pub recipients: Vec<String>,
    pub subject: String,
    pub sender: String,
    pub threshold: Level,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipients: Vec::new(),
            subject: DEFAULT_MAIL_SUBJECT.to_string(),
            sender: DEFAULT_MAIL_SENDER.to_string(),
            threshold: Level::Error,
        }
    }
}

impl MailConfig {
    /// A mail channel without recipients has nowhere to deliver to
    pub fn is_active(&self) -> bool {
        self.enabled && !self.recipients.is_empty()
    }
}

/// Chat notification channel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChatConfig {
    pub enabled: bool,
    pub room: String,
    pub token: Sensitive<String>,
    pub notify: bool,
    pub threshold: Level,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            room: DEFAULT_CHAT_ROOM.to_string(),
            token: Sensitive::default(),
            notify: true,
            threshold: Level::Info,
        }
    }
}

/// Capture window settings
///
/// `length` absent means "every frame from `offset`", unless `memoize` asks
/// for the length to be fixed by the first call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub length: Option<usize>,
    pub offset: usize,
    pub memoize: bool,
}

impl CaptureConfig {
    pub fn window(&self) -> CaptureWindow {
        let length = match (self.length, self.memoize) {
            (Some(length), _) => WindowLength::Fixed(length),
            (None, true) => WindowLength::MemoizeFirst,
            (None, false) => WindowLength::Full,
        };
        CaptureWindow::new(length, self.offset)
    }
}

impl From<CaptureWindow> for CaptureConfig {
    fn from(window: CaptureWindow) -> Self {
        let (length, memoize) = match window.length {
            WindowLength::Full => (None, false),
            WindowLength::Fixed(length) => (Some(length), false),
            WindowLength::MemoizeFirst => (None, true),
        };
        Self {
            length,
            offset: window.offset,
            memoize,
        }
    }
}
