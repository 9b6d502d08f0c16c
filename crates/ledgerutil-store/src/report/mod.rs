//! Comparison reports
//!
//! Provides:
//! - Deterministic report file naming
//! - JSON report rendering without timestamps
//! - Atomic temp-then-rename writes

pub mod atomic;
pub mod writer;

pub use writer::{report_file_name, write_report, REPORT_SCHEMA_VERSION};
