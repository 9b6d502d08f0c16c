//! Ledgerutil Store - filesystem layer for snapshot comparison
//!
//! Provides:
//! - `FsSnapshot`, a `SnapshotSource` over an on-disk snapshot directory
//! - `SnapshotExporter`, which writes snapshot directories (fixtures, tooling)
//! - The comparison report writer with atomic temp-then-rename writes

pub mod errors;
pub mod report;
pub mod snapshot;

// Re-export key types
pub use errors::Result;
pub use report::write_report;
pub use snapshot::{FsSnapshot, SnapshotExporter};
