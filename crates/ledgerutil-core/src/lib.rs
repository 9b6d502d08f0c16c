//! Ledgerutil Core - snapshot model and comparison kernel
//!
//! This crate provides the pure (I/O free) parts of snapshot comparison:
//! - Canonical error and logging facilities
//! - Snapshot metadata schema, validation and digest construction
//! - The `SnapshotSource` read interface with ordering checks
//! - The two-level merge-diff engine and its result model
//!
//! Reading snapshots from disk and writing reports lives in `ledgerutil-store`.

pub mod config;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod snapshot;

// Paths used by the exported logging macros
#[doc(hidden)]
pub use ledgerutil_core_types;
#[doc(hidden)]
pub use tracing;

// Re-export commonly used types
pub use config::{CompareOptions, DEFAULT_SAMPLE_LIMIT};
pub use diff::{compare_sources, merge_diff, ComparisonResult, SourceComparison};
pub use errors::{ConfigError, ErrorCategory, ExError, ExErrorKind, Result};
pub use snapshot::{SnapshotMetadata, SnapshotSource};
