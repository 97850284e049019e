//! Facility logging macros
//!
//! Operational events of the facade itself (logger construction, stream
//! reopening, failed deliveries) go to the current default subscriber with a
//! fixed `component`/`op`/`event` schema.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use calltrail_logging::log_op_start;
/// log_op_start!("logger_build");
/// log_op_start!("logger_build", logger = "billing");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use calltrail_logging::log_op_end;
/// log_op_end!("logger_build", duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::debug!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// `$err` is anything convertible into `LogError`.
///
/// # Example
///
/// ```
/// # use calltrail_logging::{log_op_error, LogError, LogErrorKind};
/// let err = LogError::new(LogErrorKind::Transport).with_channel("mail");
/// log_op_error!("deliver", err);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr) => {{
        let log_err: $crate::LogError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            err.kind = ?log_err.kind(),
            err.code = log_err.code(),
            err.message = %log_err,
        );
    }};
    ($op:expr, $err:expr, $($field:tt)*) => {{
        let log_err: $crate::LogError = $err.into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            err.kind = ?log_err.kind(),
            err.code = log_err.code(),
            err.message = %log_err,
            $($field)*
        );
    }};
}
