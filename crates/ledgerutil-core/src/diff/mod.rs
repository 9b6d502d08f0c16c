//! Snapshot merge-diff engine.
//!
//! Compares two snapshots already known to have different public state
//! hashes and produces a deterministic [`ComparisonResult`].
//!
//! ## Entry point
//!
//! ```ignore
//! use ledgerutil_core::diff::{compare_sources, SourceComparison};
//!
//! match compare_sources(&first, &second, 10)? {
//!     SourceComparison::Identical => {}
//!     SourceComparison::Diverged(result) => println!("{}", render_human_summary(&result)),
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Exact count**: `total_difference_count` does not depend on the sample limit.
//! - **Determinism**: identical inputs produce the same records in the same
//!   order (ascending namespace, then key).
//! - **Fail fast**: unsorted or duplicate keys abort the run instead of
//!   producing a wrong diff.

pub mod accumulator;
pub mod engine;
pub mod human_summary;
pub mod model;

pub use accumulator::DiffAccumulator;
pub use engine::{compare_sources, merge_diff, snapshot_identity, SourceComparison};
pub use human_summary::render_human_summary;
pub use model::{
    ComparisonResult, DiffCounts, DiffKind, DiffRecord, RecordSide, SnapshotIdentity,
};
