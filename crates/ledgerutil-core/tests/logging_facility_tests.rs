#![allow(clippy::unwrap_used, clippy::expect_used)]

use ledgerutil_core::errors::{ExError, ExErrorKind};
use ledgerutil_core::logging_facility::test_capture::init_test_capture;
use ledgerutil_core::snapshot::{Entry, MemorySnapshot};
use ledgerutil_core::{log_op_end, log_op_error, log_op_start, merge_diff};
use ledgerutil_core_types::schema::{
    EVENT_END, EVENT_END_ERROR, EVENT_START, FIELD_DIFF_COUNT, FIELD_DURATION_MS, FIELD_ERR_CODE,
    FIELD_SNAPSHOT,
};

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, snapshot = "/data/a");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field(FIELD_SNAPSHOT), Some("/data/a"));
}

#[test]
fn test_log_op_end_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42);

    let end_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END))
        .collect();
    assert_eq!(end_events.len(), 1, "Should have exactly one end event");
    assert_eq!(end_events[0].field(FIELD_DURATION_MS), Some("42"));
}

#[test]
fn test_log_op_error_includes_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::OrderingViolation).with_message("duplicate key");
    log_op_error!(op_name, &err, duration_ms = 10);

    let error_events: Vec<_> = capture
        .events_for_op(op_name)
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(error_events.len(), 1, "Should have exactly one error event");
    assert_eq!(
        error_events[0].field(FIELD_ERR_CODE),
        Some("ERR_ORDERING_VIOLATION")
    );
    assert_eq!(error_events[0].field("err_message"), Some("duplicate key"));
    // the error is only borrowed by the macro
    assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
}

#[test]
fn test_merge_diff_logs_start_and_end() {
    let capture = init_test_capture();

    let a = MemorySnapshot::new("log-a", "ch", 1).with_namespace("cc", vec![Entry::new("k", "1")]);
    let b = MemorySnapshot::new("log-b", "ch", 1).with_namespace("cc", vec![Entry::new("k", "2")]);
    merge_diff(&a, &b, 10).unwrap();

    capture.assert_event_exists("merge_diff", EVENT_START);
    capture.assert_event_exists("merge_diff", EVENT_END);
    let ends_with_count = capture.count_events(|e| {
        e.op.as_deref() == Some("merge_diff")
            && e.event.as_deref() == Some(EVENT_END)
            && e.field(FIELD_DIFF_COUNT) == Some("1")
    });
    assert!(ends_with_count >= 1);
}

#[test]
fn test_merge_diff_logs_error() {
    let capture = init_test_capture();

    let a = MemorySnapshot::new("log-err-a", "ch", 1).with_namespace(
        "cc",
        vec![Entry::new("k", "1"), Entry::new("k", "2")],
    );
    let b = MemorySnapshot::new("log-err-b", "ch", 1).with_namespace("cc", vec![]);
    assert!(merge_diff(&a, &b, 10).is_err());

    let errors = capture.count_events(|e| {
        e.op.as_deref() == Some("merge_diff")
            && e.event.as_deref() == Some(EVENT_END_ERROR)
            && e.field(FIELD_ERR_CODE) == Some("ERR_ORDERING_VIOLATION")
    });
    assert!(errors >= 1);
}
