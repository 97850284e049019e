#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Facility events land on the global subscriber. Every test uses unique
//! logger names because the capture is shared.

use calltrail_logging::test_capture::init_test_capture;
use calltrail_logging::{
    log_op_end, log_op_error, log_op_start, Context, LogError, LogErrorKind, Logger, Notification,
    Outbox, Result, Transport,
};

struct RefusingTransport;

impl Transport for RefusingTransport {
    fn deliver(&self, notification: &Notification) -> Result<()> {
        Err(LogError::new(LogErrorKind::Transport)
            .with_op("deliver")
            .with_message(format!("relay refused {}", notification.record.message)))
    }
}

#[test]
fn test_log_op_macros_captured() {
    let capture = init_test_capture();

    log_op_start!("facility_macros_op");
    log_op_end!("facility_macros_op", duration_ms = 4);
    log_op_error!(
        "facility_macros_op",
        LogError::new(LogErrorKind::InvalidInput).with_message("bad pair")
    );

    capture.assert_event_exists("facility_macros_op", "start");
    capture.assert_event_exists("facility_macros_op", "end");
    capture.assert_event_exists("facility_macros_op", "end_error");

    let errors: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("facility_macros_op")
                && e.event.as_deref() == Some("end_error")
        })
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].level, tracing::Level::WARN);
    assert_eq!(
        errors[0].fields.get("err.code").map(String::as_str),
        Some("ERR_INVALID_INPUT")
    );
}

#[test]
fn test_logger_build_emits_start_and_end() {
    let capture = init_test_capture();

    Logger::builder()
        .name("facility_build_logger")
        .without_stream()
        .build()
        .unwrap();

    let build_events = capture.count_events(|e| {
        e.op.as_deref() == Some("logger_build")
            && e.fields.get("logger").map(String::as_str) == Some("facility_build_logger")
    });
    assert_eq!(build_events, 2);
}

#[test]
fn test_logger_build_failure_emits_end_error() {
    let capture = init_test_capture();
    let dir = tempfile::tempdir().unwrap();

    let err = Logger::builder()
        .name("facility_broken_logger")
        .stream_target(dir.path().join("missing").join("app.log"))
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), LogErrorKind::Io);

    let failures = capture.count_events(|e| {
        e.op.as_deref() == Some("logger_build")
            && e.event.as_deref() == Some("end_error")
            && e.fields.get("logger").map(String::as_str) == Some("facility_broken_logger")
    });
    assert_eq!(failures, 1);
}

#[test]
fn test_failed_delivery_is_reported_not_raised() {
    let capture = init_test_capture();

    let logger = Logger::builder()
        .name("facility_refused_logger")
        .without_stream()
        .mail_recipients(["ops@example.com"])
        .transport(RefusingTransport)
        .build()
        .unwrap();

    // Both mail and chat fail, the call still counts as handled
    assert!(logger.error("disk full", Context::new()));

    let failures: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| {
            e.op.as_deref() == Some("deliver")
                && e.fields.get("logger").map(String::as_str) == Some("facility_refused_logger")
        })
        .collect();
    assert_eq!(failures.len(), 2);
    for failure in &failures {
        assert_eq!(failure.event.as_deref(), Some("end_error"));
        assert_eq!(
            failure.fields.get("err.code").map(String::as_str),
            Some("ERR_TRANSPORT")
        );
    }
    assert!(failures
        .iter()
        .any(|f| f.fields["err.message"].contains("channel: mail")));
    assert!(failures
        .iter()
        .any(|f| f.fields["err.message"].contains("channel: chat")));
}

#[test]
fn test_records_stay_off_the_global_subscriber() {
    let capture = init_test_capture();
    let outbox = Outbox::new();

    let logger = Logger::builder()
        .name("facility_private_logger")
        .without_stream()
        .transport(outbox.clone())
        .build()
        .unwrap();
    logger.info("only for chat", Context::new());

    assert_eq!(outbox.len(), 1);
    assert_eq!(
        capture.count_events(|e| e.message() == Some("only for chat")),
        0
    );
}
