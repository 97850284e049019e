//! Test capture mode for deterministic logging assertions
//!
//! A layer that keeps every event in memory. It can be installed globally
//! with [`init_test_capture`] (facility events) or attached to a single
//! logger with `LoggerBuilder::with_test_capture` (records).

use crate::fields::FieldVisitor;
use calltrail_core::{Context, Level as RecordLevel};
use calltrail_core_types::schema::{
    FIELD_CONTEXT, FIELD_EVENT, FIELD_LOGGER, FIELD_MESSAGE, FIELD_OP,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// A captured log event with all its fields
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub logger: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    /// Facade severity, for events emitted by a logger
    pub fn severity(&self) -> Option<RecordLevel> {
        RecordLevel::from_target(&self.target)
    }

    pub fn message(&self) -> Option<&str> {
        self.fields.get(FIELD_MESSAGE).map(String::as_str)
    }

    /// Record context decoded from its JSON field
    pub fn context(&self) -> Option<Context> {
        self.fields
            .get(FIELD_CONTEXT)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

/// Test capture layer for collecting log events
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let capture = TestCapture::default();
        (Self::for_capture(&capture), capture)
    }

    /// Another layer feeding an existing capture
    pub fn for_capture(capture: &TestCapture) -> Self {
        Self {
            events: capture.events.clone(),
        }
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
        let metadata = event.metadata();
        let fields = FieldVisitor::collect(event).fields;

        let captured = CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            logger: fields.get(FIELD_LOGGER).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Handle for accessing captured events in tests
#[derive(Clone, Default)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Get all captured events
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted by the logger called `logger`
    pub fn records_of(&self, logger: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.logger.as_deref() == Some(logger))
            .collect()
    }

    /// Assert that an event exists with the given operation and event type
    ///
    /// # Panics
    ///
    /// Panics if the event is not found
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        let found = events
            .iter()
            .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event));
        assert!(
            found,
            "Expected event op={} event={} not found in {} captured events",
            op,
            event,
            events.len()
        );
    }

    /// Clear all captured events
    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Initialize test capture mode
///
/// Installs the capture layer as the global subscriber on first use and
/// returns the shared handle. Tests share it, so filter by unique names.
///
/// # Example
///
/// ```
/// use calltrail_logging::log_op_start;
/// use calltrail_logging::test_capture::init_test_capture;
///
/// let capture = init_test_capture();
/// log_op_start!("my_operation");
/// capture.assert_event_exists("my_operation", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            // Another test harness may have claimed the global slot first.
            let _ = tracing_subscriber::registry().with(layer).try_init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captured_event_accessors() {
        let mut fields = HashMap::new();
        fields.insert(FIELD_MESSAGE.to_string(), "paid".to_string());
        fields.insert(FIELD_CONTEXT.to_string(), r#"{"amount":5}"#.to_string());

        let event = CapturedEvent {
            level: Level::INFO,
            target: RecordLevel::Notice.target().to_string(),
            logger: Some("billing".to_string()),
            op: None,
            event: None,
            fields,
        };

        assert_eq!(event.severity(), Some(RecordLevel::Notice));
        assert_eq!(event.message(), Some("paid"));
        assert_eq!(event.context().unwrap()["amount"], 5);
    }

    #[test]
    fn test_scoped_capture_layer() {
        let (layer, capture) = TestCaptureLayer::new();
        let subscriber = tracing_subscriber::registry().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(logger = "scoped", "hello");
        });

        let records = capture.records_of("scoped");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message(), Some("hello"));
        capture.clear();
        assert!(capture.events().is_empty());
    }
}
