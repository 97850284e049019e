//! calltrail logging facade
//!
//! This crate wires the capture core to a `tracing` backend:
//! - [`Logger`]: per-level methods, caller-context merging, one `Dispatch`
//!   per logger instance
//! - Output channels: JSON stream file, mail and chat notifications
//! - [`Transport`] seam for notification delivery, with the default
//!   [`Discard`] and the in-memory [`Outbox`]
//! - [`LoggerConfig`] loaded from TOML
//! - Global facility initialisation via `init(profile)` and a test capture
//!   layer for deterministic assertions
//!
//! # Usage
//!
//! ```no_run
//! use calltrail_logging::{context, Logger};
//!
//! let logger = Logger::new(Some("billing"), None)?;
//! logger.info("invoice sent", context! { "invoice_id" => 981 });
//! # Ok::<(), calltrail_errors::LogError>(())
//! ```

pub mod channels;
pub mod config;
pub mod init;
pub mod logger;
pub mod macros;
pub mod test_capture;
pub mod transport;

mod fields;

pub use calltrail_core::{context, enter_frame, CaptureWindow, Context, Level, WindowLength};
pub use calltrail_core_types::schema;
pub use calltrail_errors::{LogError, LogErrorKind, Result};
pub use channels::{Envelope, Notification};
pub use config::{CaptureConfig, ChatConfig, LoggerConfig, MailConfig, StreamConfig};
pub use init::{init, Profile};
pub use logger::{Logger, LoggerBuilder};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture, TestCaptureLayer};
pub use transport::{Discard, Outbox, Transport};
