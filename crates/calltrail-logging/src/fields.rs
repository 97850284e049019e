//! Field collection for `tracing` events

use calltrail_core::{Context, Level, LogRecord};
use calltrail_core_types::schema::{FIELD_CONTEXT, FIELD_DATETIME, FIELD_LOGGER, FIELD_MESSAGE};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::field::{Field, Visit};

/// Collects every field of an event as a string
#[derive(Debug, Default)]
pub(crate) struct FieldVisitor {
    pub(crate) fields: HashMap<String, String>,
}

impl FieldVisitor {
    pub(crate) fn collect(event: &tracing::Event<'_>) -> Self {
        let mut visitor = Self::default();
        event.record(&mut visitor);
        visitor
    }

    /// Rebuild the record a logger emitted at `level`
    ///
    /// A context field that is not a JSON object yields an empty context. The
    /// creation time is kept when the event carries a valid RFC 3339
    /// `datetime`.
    pub(crate) fn into_record(mut self, level: Level) -> LogRecord {
        let context = self
            .fields
            .get(FIELD_CONTEXT)
            .and_then(|raw| serde_json::from_str::<Context>(raw).ok())
            .unwrap_or_default();
        let logger = self.fields.remove(FIELD_LOGGER).unwrap_or_default();
        let message = self.fields.remove(FIELD_MESSAGE).unwrap_or_default();
        let datetime = self
            .fields
            .get(FIELD_DATETIME)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|datetime| datetime.with_timezone(&Utc));

        let record = LogRecord::new(logger, level, message).with_context(context);
        match datetime {
            Some(datetime) => record.with_datetime(datetime),
            None => record,
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}
