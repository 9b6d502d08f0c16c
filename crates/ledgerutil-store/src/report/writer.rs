//! Comparison report writer.
//!
//! The report is pretty-printed JSON built entirely from the
//! [`ComparisonResult`]. It carries no timestamps, so comparing the same
//! snapshots twice produces byte-identical files.

#![allow(clippy::result_large_err)]

use crate::errors::{serialization_error, Result};
use crate::report::atomic::atomic_write;
use ledgerutil_core::diff::{ComparisonResult, DiffCounts, DiffRecord, SnapshotIdentity};
use ledgerutil_core::{log_op_end, log_op_error, log_op_start};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Version of the report document layout
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Hex characters of each public state hash used in the file name
const HASH_PREFIX_LEN: usize = 8;

#[derive(Serialize)]
struct ReportDocument<'a> {
    report_schema_version: u32,
    first_snapshot: &'a SnapshotIdentity,
    second_snapshot: &'a SnapshotIdentity,
    identical: bool,
    total_difference_count: u64,
    counts: &'a DiffCounts,
    namespace_counts: &'a BTreeMap<String, DiffCounts>,
    sample_limit: usize,
    sampled_differences: &'a [DiffRecord],
}

impl<'a> From<&'a ComparisonResult> for ReportDocument<'a> {
    fn from(result: &'a ComparisonResult) -> Self {
        Self {
            report_schema_version: REPORT_SCHEMA_VERSION,
            first_snapshot: &result.first,
            second_snapshot: &result.second,
            identical: result.identical,
            total_difference_count: result.total_difference_count,
            counts: &result.counts,
            namespace_counts: &result.namespace_counts,
            sample_limit: result.sample_limit,
            sampled_differences: &result.sampled_differences,
        }
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`
fn sanitize(component: &str) -> String {
    component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `<channel>_<height>_<hashA[0..8]>_<hashB[0..8]>_comparison.json`
pub fn report_file_name(result: &ComparisonResult) -> String {
    format!(
        "{}_{}_{}_{}_comparison.json",
        sanitize(&result.first.channel_name),
        result.first.height,
        result.first.public_state_hash.short_hex(HASH_PREFIX_LEN),
        result.second.public_state_hash.short_hex(HASH_PREFIX_LEN),
    )
}

/// Render the report document
pub fn render_report(result: &ComparisonResult) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(&ReportDocument::from(result))
        .map_err(|e| serialization_error("render_report", e))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Write the report for `result` into `output_dir` and return its path.
///
/// `output_dir` is created if absent. An existing report with the same name
/// is replaced.
///
/// # Errors
///
/// - `Serialization` if the report cannot be rendered
/// - `Io` if the directory or file cannot be written
pub fn write_report(result: &ComparisonResult, output_dir: &Path) -> Result<PathBuf> {
    log_op_start!(
        "write_report",
        diff_count = result.total_difference_count
    );
    let start = Instant::now();

    let path = output_dir.join(report_file_name(result));
    let written = render_report(result).and_then(|bytes| atomic_write(&path, &bytes));
    if let Err(e) = written {
        log_op_error!(
            "write_report",
            &e,
            duration_ms = start.elapsed().as_millis() as u64
        );
        return Err(e);
    }

    log_op_end!(
        "write_report",
        duration_ms = start.elapsed().as_millis() as u64,
        report_path = %path.display()
    );
    Ok(path)
}
