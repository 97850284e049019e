//! The record handed to the backend after context merging

use crate::context::Context;
use crate::level::Level;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fully assembled log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Name of the logger that produced the record
    pub logger: String,
    pub level: Level,
    pub message: String,
    pub context: Context,
    pub datetime: DateTime<Utc>,
}

impl LogRecord {
    pub fn new(logger: impl Into<String>, level: Level, message: impl Into<String>) -> Self {
        Self {
            logger: logger.into(),
            level,
            message: message.into(),
            context: Context::new(),
            datetime: Utc::now(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_datetime(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = datetime;
        self
    }

    /// Context rendered as a compact JSON object
    pub fn context_json(&self) -> String {
        // A map of JSON values with string keys always serializes.
        serde_json::to_string(&self.context).unwrap_or_else(|_| "{}".to_string())
    }
}
