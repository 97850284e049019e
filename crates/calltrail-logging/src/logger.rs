//! The logger facade
//!
//! A [`Logger`] owns a `tracing::Dispatch` built from its configured
//! channels. Each per-level method:
//!
//! 1. captures the call stack at the caller (`#[track_caller]` plus frames
//!    registered with `enter_frame!`),
//! 2. runs the capture window over it and merges the resulting
//!    `_backtrace_level_<i>` keys into the caller's context without
//!    overwriting caller keys,
//! 3. emits the record into the logger's dispatch,
//! 4. returns whether any channel accepted the level.

use crate::channels::notify::NotifyLayer;
use crate::channels::{stream, BoxedLayer, DeliveryFailures, Envelope};
use crate::config::LoggerConfig;
use crate::test_capture::{TestCapture, TestCaptureLayer};
use crate::transport::{Discard, Transport};
use crate::{log_op_end, log_op_error, log_op_start};
use calltrail_core::{
    merge_caller_context, CallStack, CallerContextCapture, CaptureWindow, Context, Level,
    LogRecord, WindowLength,
};
use calltrail_core_types::schema::{CHANNEL_CHAT, CHANNEL_MAIL, CHANNEL_STREAM};
use calltrail_errors::Result;
use chrono::SecondsFormat;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;

/// Emit one record event; target and level must be literals per call site
macro_rules! record_event {
    ($target:literal, $level:expr, $record:ident, $context:ident, $datetime:ident) => {
        tracing::event!(
            target: $target,
            $level,
            logger = %$record.logger,
            severity = $record.level.name(),
            severity_code = $record.level.code(),
            datetime = %$datetime,
            context = %$context,
            "{}",
            $record.message
        )
    };
}

/// Logging facade with caller-context capture
pub struct Logger {
    config: LoggerConfig,
    capture: CallerContextCapture,
    transport: Arc<dyn Transport>,
    test_capture: Option<TestCapture>,
    backend: Backend,
}

impl Logger {
    /// Create a logger with default channels
    ///
    /// Missing or empty values fall back to `"Logger"` and `"logger.log"`.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the stream target cannot be opened.
    pub fn new(name: Option<&str>, stream_target: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(name) = name {
            builder = builder.name(name);
        }
        if let Some(target) = stream_target {
            builder = builder.stream_target(target);
        }
        builder.build()
    }

    /// # Errors
    ///
    /// Returns an `Io` error if the stream target cannot be opened.
    pub fn from_config(config: LoggerConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn stream_target(&self) -> &Path {
        &self.config.stream.target
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn capture_window(&self) -> CaptureWindow {
        self.capture.window()
    }

    /// Length fixed by the first record, for a memoizing window
    pub fn memoized_capture_length(&self) -> Option<usize> {
        self.capture.memoized_length()
    }

    /// Replace the capture window; resets any memoized length
    ///
    /// Meant for setup. Taking `&mut self` keeps the window fixed while the
    /// logger is shared.
    pub fn set_capture_window(&mut self, length: WindowLength, offset: usize) {
        self.capture.set_window(length, offset);
        self.config.capture = self.capture.window().into();
    }

    /// Rename the logger; an empty name keeps the current one
    pub fn set_logger_name(&mut self, name: &str) {
        self.config.set_name(name);
    }

    /// Point the stream channel at another file; an empty path keeps the
    /// current one
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the new target cannot be opened. The logger
    /// keeps writing to the previous target in that case.
    pub fn set_stream_name(&mut self, target: impl AsRef<Path>) -> Result<()> {
        let target = target.as_ref();
        if target.as_os_str().is_empty() || target == self.stream_target() {
            return Ok(());
        }

        let mut config = self.config.clone();
        config.set_stream_target(target);
        self.backend = Backend::build(&config, &self.transport, self.test_capture.as_ref())?;
        self.config = config;
        Ok(())
    }

    /// Names of the channels this logger writes to
    pub fn channels(&self) -> Vec<&'static str> {
        self.backend.channels.iter().map(|(name, _)| *name).collect()
    }

    /// Whether any channel accepts records at `level`
    pub fn handles(&self, level: Level) -> bool {
        self.backend.handles(level)
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Debug, message, context)
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Info, message, context)
    }

    #[track_caller]
    pub fn notice(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Notice, message, context)
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Warning, message, context)
    }

    #[track_caller]
    pub fn warning(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Warning, message, context)
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Error, message, context)
    }

    #[track_caller]
    pub fn critical(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Critical, message, context)
    }

    #[track_caller]
    pub fn alert(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Alert, message, context)
    }

    #[track_caller]
    pub fn emergency(&self, message: impl Into<String>, context: Context) -> bool {
        self.add_record(Level::Emergency, message, context)
    }

    /// Log at `level`, capturing the caller's stack
    #[track_caller]
    pub fn add_record(&self, level: Level, message: impl Into<String>, context: Context) -> bool {
        self.add_record_with_stack(level, message, context, &CallStack::capture_here())
    }

    /// Log at `level` with an explicitly supplied stack (innermost first)
    pub fn add_record_with_stack(
        &self,
        level: Level,
        message: impl Into<String>,
        context: Context,
        stack: &CallStack,
    ) -> bool {
        if !self.backend.handles(level) {
            return false;
        }

        let caller = self.capture.capture(stack);
        let record = LogRecord::new(self.config.name.clone(), level, message)
            .with_context(merge_caller_context(context, &caller));

        self.backend.emit(&record);
        true
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.config.name)
            .field("stream_target", &self.config.stream.target)
            .field("channels", &self.channels())
            .field("capture_window", &self.capture.window())
            .finish()
    }
}

/// Builder for [`Logger`]
#[derive(Default)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    transport: Option<Arc<dyn Transport>>,
    test_capture: Option<TestCapture>,
}

impl LoggerBuilder {
    /// Start from a full configuration
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    /// Logger name; empty keeps the current one
    pub fn name(mut self, name: &str) -> Self {
        self.config.set_name(name);
        self
    }

    /// Stream target; empty keeps the current one
    pub fn stream_target(mut self, target: impl AsRef<Path>) -> Self {
        self.config.set_stream_target(target.as_ref());
        self
    }

    pub fn capture_window(mut self, window: CaptureWindow) -> Self {
        self.config.capture = window.into();
        self
    }

    /// Deliver mail and chat notifications through `transport`
    ///
    /// Defaults to [`Discard`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn mail_recipients<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.mail.recipients = recipients.into_iter().map(Into::into).collect();
        self
    }

    pub fn without_stream(mut self) -> Self {
        self.config.stream.enabled = false;
        self
    }

    pub fn without_mail(mut self) -> Self {
        self.config.mail.enabled = false;
        self
    }

    pub fn without_chat(mut self) -> Self {
        self.config.chat.enabled = false;
        self
    }

    /// Also feed every record into `capture`
    pub fn with_test_capture(mut self, capture: &TestCapture) -> Self {
        self.test_capture = Some(capture.clone());
        self
    }

    /// # Errors
    ///
    /// Returns an `Io` error if the stream target cannot be opened.
    pub fn build(self) -> Result<Logger> {
        let started = Instant::now();
        let config = self.config;
        log_op_start!("logger_build", logger = %config.name);

        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(Discard) as Arc<dyn Transport>);

        let backend = match Backend::build(&config, &transport, self.test_capture.as_ref()) {
            Ok(backend) => backend,
            Err(err) => {
                log_op_error!("logger_build", err.clone(), logger = %config.name);
                return Err(err);
            }
        };

        log_op_end!(
            "logger_build",
            duration_ms = started.elapsed().as_millis() as u64,
            logger = %config.name,
            channels = ?backend.channels,
        );

        Ok(Logger {
            capture: CallerContextCapture::new(config.capture.window()),
            config,
            transport,
            test_capture: self.test_capture,
            backend,
        })
    }
}

/// The dispatch a logger writes into, plus what it is wired to
struct Backend {
    dispatch: Dispatch,
    failures: DeliveryFailures,
    channels: Vec<(&'static str, Level)>,
}

impl Backend {
    fn build(
        config: &LoggerConfig,
        transport: &Arc<dyn Transport>,
        test_capture: Option<&TestCapture>,
    ) -> Result<Self> {
        let failures = DeliveryFailures::default();
        let mut layers: Vec<BoxedLayer> = Vec::new();
        let mut channels = Vec::new();

        if config.stream.enabled {
            let file = stream::open_target(&config.stream.target)?;
            layers.push(stream::layer(file, config.stream.threshold));
            channels.push((CHANNEL_STREAM, config.stream.threshold));
        }

        if config.mail.is_active() {
            let layer =
                NotifyLayer::new(Envelope::from(&config.mail), transport.clone(), failures.clone());
            layers.push(layer.boxed_with_threshold(config.mail.threshold));
            channels.push((CHANNEL_MAIL, config.mail.threshold));
        }

        if config.chat.enabled {
            let layer =
                NotifyLayer::new(Envelope::from(&config.chat), transport.clone(), failures.clone());
            layers.push(layer.boxed_with_threshold(config.chat.threshold));
            channels.push((CHANNEL_CHAT, config.chat.threshold));
        }

        if let Some(capture) = test_capture {
            layers.push(Box::new(TestCaptureLayer::for_capture(capture)));
        }

        Ok(Self {
            dispatch: Dispatch::new(tracing_subscriber::registry().with(layers)),
            failures,
            channels,
        })
    }

    fn handles(&self, level: Level) -> bool {
        self.channels.iter().any(|(_, threshold)| level >= *threshold)
    }

    fn emit(&self, record: &LogRecord) {
        let context = record.context_json();
        let datetime = record.datetime.to_rfc3339_opts(SecondsFormat::Nanos, true);

        tracing::dispatcher::with_default(&self.dispatch, || match record.level {
            Level::Debug => {
                record_event!("calltrail::debug", tracing::Level::DEBUG, record, context, datetime)
            }
            Level::Info => {
                record_event!("calltrail::info", tracing::Level::INFO, record, context, datetime)
            }
            Level::Notice => {
                record_event!("calltrail::notice", tracing::Level::INFO, record, context, datetime)
            }
            Level::Warning => {
                record_event!("calltrail::warning", tracing::Level::WARN, record, context, datetime)
            }
            Level::Error => {
                record_event!("calltrail::error", tracing::Level::ERROR, record, context, datetime)
            }
            Level::Critical => {
                record_event!("calltrail::critical", tracing::Level::ERROR, record, context, datetime)
            }
            Level::Alert => {
                record_event!("calltrail::alert", tracing::Level::ERROR, record, context, datetime)
            }
            Level::Emergency => {
                record_event!("calltrail::emergency", tracing::Level::ERROR, record, context, datetime)
            }
        });

        // Outside the logger's dispatch, so failures reach the host's
        // subscriber rather than the channels that just failed.
        for err in self.failures.drain() {
            log_op_error!("deliver", err, logger = %record.logger);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calltrail_core::{context, enter_frame};
    use calltrail_core_types::schema::backtrace_key;

    fn quiet_logger(capture: &TestCapture) -> Logger {
        Logger::builder()
            .name("unit")
            .without_stream()
            .with_test_capture(capture)
            .build()
            .unwrap()
    }

    #[test]
    fn test_event_targets_match_level_targets() {
        let capture = TestCapture::default();
        let logger = quiet_logger(&capture);

        for level in Level::ALL {
            logger.add_record(level, level.name(), Context::new());
        }

        let events = capture.records_of("unit");
        let targets: Vec<&str> = events.iter().map(|e| e.target.as_str()).collect();
        let expected: Vec<&str> = Level::ALL
            .into_iter()
            .filter(|level| *level >= Level::Info)
            .map(Level::target)
            .collect();
        assert_eq!(targets, expected);
        for event in &events {
            assert_eq!(
                event.severity().map(|l| l.as_tracing()),
                Some(event.level)
            );
        }
    }

    #[test]
    fn test_first_frame_is_the_call_site() {
        let capture = TestCapture::default();
        let logger = quiet_logger(&capture);

        let line = line!() + 1;
        logger.info("here", Context::new());

        let ctx = capture.records_of("unit")[0].context().unwrap();
        let expected = format!("{}:{}", file!(), line);
        assert_eq!(ctx[&backtrace_key(0)], expected.as_str());
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_registered_frames_follow_call_site() {
        let capture = TestCapture::default();
        let logger = quiet_logger(&capture);

        let _outer = enter_frame!("src/handler.rs", 10);
        logger.warn("nested", context! { "user" => 7 });

        let ctx = capture.records_of("unit")[0].context().unwrap();
        assert_eq!(ctx["user"], 7);
        assert_eq!(ctx[&backtrace_key(1)], "src/handler.rs:10");
    }

    #[test]
    fn test_below_every_threshold_is_not_handled() {
        let capture = TestCapture::default();
        let logger = quiet_logger(&capture);

        assert!(!logger.debug("dropped", Context::new()));
        assert!(capture.records_of("unit").is_empty());
    }

    #[test]
    fn test_set_capture_window_updates_config() {
        let capture = TestCapture::default();
        let mut logger = quiet_logger(&capture);

        logger.set_capture_window(WindowLength::Fixed(2), 1);

        assert_eq!(
            logger.capture_window(),
            CaptureWindow::new(WindowLength::Fixed(2), 1)
        );
        assert_eq!(logger.config().capture.length, Some(2));
        assert_eq!(logger.config().capture.offset, 1);
    }

    #[test]
    fn test_set_logger_name_ignores_empty() {
        let capture = TestCapture::default();
        let mut logger = quiet_logger(&capture);

        logger.set_logger_name("");
        assert_eq!(logger.name(), "unit");
        logger.set_logger_name("renamed");
        assert_eq!(logger.name(), "renamed");
    }

    #[test]
    fn test_default_transport_retains_nothing() {
        let logger = Logger::builder().without_stream().build().unwrap();
        assert_eq!(logger.channels(), vec![CHANNEL_CHAT]);

        for i in 0..1_000 {
            assert!(logger.info(format!("tick {}", i), Context::new()));
        }

        // Zero-sized: there is nowhere to keep a notification
        assert_eq!(std::mem::size_of_val(&*logger.transport), 0);
    }
}
