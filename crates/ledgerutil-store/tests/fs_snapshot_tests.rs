#![allow(clippy::unwrap_used, clippy::expect_used)]

use ledgerutil_core::errors::{ErrorCategory, ExErrorKind};
use ledgerutil_core::logging_facility::init_test_capture;
use ledgerutil_core::snapshot::{Entry, SnapshotSource};
use ledgerutil_store::snapshot::{encode_entry_line, FsSnapshot, SnapshotExporter};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn exported(dir: &Path) -> FsSnapshot {
    SnapshotExporter::new("mychannel", 9)
        .put_versioned("chaincode1", "k1", "v1", 3, 0)
        .put_versioned("chaincode1", "k2", "v2", 4, 1)
        .put("chaincode2", "a", "")
        .export(dir)
        .unwrap();
    FsSnapshot::open(dir).unwrap()
}

/// Replace the data file of `namespace` with the given entries, in the given order
fn rewrite_data(dir: &Path, namespace: &str, entries: &[Entry]) {
    let snap = FsSnapshot::open(dir).unwrap();
    let file = snap.descriptor(namespace).unwrap().file.clone();
    let content: String = entries
        .iter()
        .map(|e| encode_entry_line(e).unwrap() + "\n")
        .collect();
    fs::write(dir.join(file), content).unwrap();
}

fn edit_metadata(dir: &Path, edit: impl FnOnce(&mut Value)) {
    let path = dir.join("_snapshot_metadata.json");
    let mut doc: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    edit(&mut doc);
    fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
}

fn drain(snap: &FsSnapshot, namespace: &str) -> ledgerutil_store::Result<Vec<Entry>> {
    snap.entries(namespace)?.collect()
}

#[test]
fn test_open_reads_metadata_only() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());

    assert_eq!(snap.label(), dir.path().display().to_string());
    assert_eq!(snap.metadata().channel_name, "mychannel");
    assert_eq!(snap.metadata().height(), 10);
    assert_eq!(snap.public_state_hash().as_bytes().len(), 32);

    let names: Vec<&str> = snap.namespaces().collect();
    assert_eq!(names, vec!["chaincode1", "chaincode2"]);
}

#[test]
fn test_entries_stream_in_key_order_with_versions() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());

    let entries = drain(&snap, "chaincode1").unwrap();
    assert_eq!(
        entries,
        vec![
            Entry::new("k1", "v1").with_version(3, 0),
            Entry::new("k2", "v2").with_version(4, 1),
        ]
    );

    let empty_value = drain(&snap, "chaincode2").unwrap();
    assert_eq!(empty_value, vec![Entry::new("a", "")]);
}

#[test]
fn test_entries_can_be_streamed_twice() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    assert_eq!(
        drain(&snap, "chaincode1").unwrap(),
        drain(&snap, "chaincode1").unwrap()
    );
}

#[test]
fn test_missing_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = FsSnapshot::open(dir.path().join("absent")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
    assert_eq!(err.category(), ErrorCategory::Io);
}

#[test]
fn test_file_instead_of_directory_is_io_error() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("plain");
    fs::write(&file, b"x").unwrap();
    assert_eq!(FsSnapshot::open(&file).unwrap_err().kind(), ExErrorKind::Io);
}

#[test]
fn test_missing_metadata_is_format_error() {
    let dir = TempDir::new().unwrap();
    let err = FsSnapshot::open(dir.path()).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidMetadata);
    assert_eq!(err.category(), ErrorCategory::Format);
}

#[test]
fn test_corrupt_metadata_is_format_error() {
    let dir = TempDir::new().unwrap();
    exported(dir.path());
    fs::write(dir.path().join("_snapshot_metadata.json"), b"{\"format_version\":").unwrap();
    assert_eq!(
        FsSnapshot::open(dir.path()).unwrap_err().category(),
        ErrorCategory::Format
    );
}

#[test]
fn test_unknown_namespace() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    let err = snap.entries("nope").err().unwrap();
    assert_eq!(err.kind(), ExErrorKind::NamespaceNotFound);
}

#[test]
fn test_missing_data_file_is_format_error() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    let file = snap.descriptor("chaincode1").unwrap().file.clone();
    fs::remove_file(dir.path().join(file)).unwrap();

    let err = snap.entries("chaincode1").err().unwrap();
    assert_eq!(err.category(), ErrorCategory::Format);
    assert_eq!(err.namespace(), Some("chaincode1"));
}

#[test]
fn test_malformed_line_reports_position() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    let file = snap.descriptor("chaincode1").unwrap().file.clone();
    let path = dir.path().join(file);
    let mut content = fs::read_to_string(&path).unwrap();
    content.push_str("{\"key\": 12}\n");
    fs::write(&path, content).unwrap();

    let err = drain(&snap, "chaincode1").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidEntry);
    assert_eq!(err.location(), Some("line 3"));
    assert_eq!(err.snapshot(), Some(snap.label()));
}

#[test]
fn test_non_utf8_line_is_format_error() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    let file = snap.descriptor("chaincode2").unwrap().file.clone();
    fs::write(dir.path().join(file), b"\xff\xfe garbage\n").unwrap();

    let err = drain(&snap, "chaincode2").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidEntry);
    assert_eq!(err.category(), ErrorCategory::Format);
    assert_eq!(err.location(), Some("line 1"));
    assert_eq!(err.namespace(), Some("chaincode2"));
}

#[test]
fn test_out_of_order_data_fails_during_iteration() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    rewrite_data(
        dir.path(),
        "chaincode1",
        &[Entry::new("k2", "v2"), Entry::new("k1", "v1")],
    );

    let mut stream = snap.entries("chaincode1").unwrap();
    assert!(stream.next().unwrap().is_ok());
    let err = stream.next().unwrap().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
    assert!(stream.next().is_none());
}

#[test]
fn test_duplicate_key_fails() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    rewrite_data(
        dir.path(),
        "chaincode1",
        &[Entry::new("k1", "v1"), Entry::new("k1", "v1")],
    );
    assert_eq!(
        drain(&snap, "chaincode1").unwrap_err().kind(),
        ExErrorKind::OrderingViolation
    );
}

#[test]
fn test_tampered_value_fails_digest_check() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    rewrite_data(
        dir.path(),
        "chaincode1",
        &[Entry::new("k1", "v1"), Entry::new("k2", "tampered")],
    );
    assert_eq!(
        drain(&snap, "chaincode1").unwrap_err().kind(),
        ExErrorKind::DigestMismatch
    );
}

#[test]
fn test_truncated_data_fails_count_check() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    rewrite_data(dir.path(), "chaincode1", &[Entry::new("k1", "v1")]);
    assert_eq!(
        drain(&snap, "chaincode1").unwrap_err().kind(),
        ExErrorKind::EntryCountMismatch
    );
}

#[test]
fn test_escaping_data_path_rejected_on_open() {
    let dir = TempDir::new().unwrap();
    exported(dir.path());
    edit_metadata(dir.path(), |doc| {
        doc["namespaces"][0]["file"] = Value::from("../../etc/passwd");
    });
    assert_eq!(
        FsSnapshot::open(dir.path()).unwrap_err().kind(),
        ExErrorKind::InvalidMetadata
    );
}

#[test]
fn test_blank_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());
    let file = snap.descriptor("chaincode2").unwrap().file.clone();
    let path = dir.path().join(file);
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, format!("\n{}\n", content)).unwrap();

    assert_eq!(drain(&snap, "chaincode2").unwrap().len(), 1);
}

#[test]
fn test_open_logs_start_and_end() {
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let snap = exported(dir.path());

    let events: Vec<_> = capture
        .events_for_op("open_snapshot")
        .into_iter()
        .filter(|e| e.field("snapshot") == Some(snap.label()))
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event.as_deref(), Some("start"));
    assert_eq!(events[1].event.as_deref(), Some("end"));
    assert_eq!(events[1].field("channel"), Some("mychannel"));
}
