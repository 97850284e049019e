//! Canonical schema constants for log records and facility events
//!
//! These constants keep the field names emitted by the facade, the
//! channels and the test capture layer in one place.

// Reserved context key prefix for captured caller frames
pub const BACKTRACE_KEY_PREFIX: &str = "_backtrace_level_";

// Record fields carried on every facade event
pub const FIELD_LOGGER: &str = "logger";
pub const FIELD_CONTEXT: &str = "context";
pub const FIELD_DATETIME: &str = "datetime";
pub const FIELD_MESSAGE: &str = "message";

// Facility event fields
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Output channel names
pub const CHANNEL_STREAM: &str = "stream";
pub const CHANNEL_MAIL: &str = "mail";
pub const CHANNEL_CHAT: &str = "chat";

// Canonical facility event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

/// Build the reserved context key for the frame at `index`.
pub fn backtrace_key(index: usize) -> String {
    format!("{}{}", BACKTRACE_KEY_PREFIX, index)
}

/// Returns true when `key` lives in the reserved backtrace namespace.
pub fn is_backtrace_key(key: &str) -> bool {
    key.strip_prefix(BACKTRACE_KEY_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}
