//! Error handling for ledgerutil-store
//!
//! Wraps ledgerutil-core ExError with store-specific helpers

use ledgerutil_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error that names the file it happened on
pub fn io_error_at(operation: &str, path: &std::path::Path, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(format!("{}: {}", path.display(), err))
}

/// Create an error for a data line that cannot be decoded
pub fn invalid_entry(snapshot: &str, namespace: &str, line: u64, reason: String) -> ExError {
    ExError::new(ExErrorKind::InvalidEntry)
        .with_op("read_entries")
        .with_snapshot(snapshot)
        .with_namespace(namespace)
        .with_location(format!("line {}", line))
        .with_message(reason)
}

/// Create a serialization error
pub fn serialization_error(operation: &str, err: serde_json::Error) -> ExError {
    ExError::from(err).with_op(operation.to_string())
}
