//! Snapshot comparison driver.
//!
//! ## Pipeline (in order):
//! 1. Validate options (no I/O before this passes)
//! 2. Open both snapshots (metadata only)
//! 3. Comparability check (channel, height)
//! 4. Public state hash comparison; equal hashes end the run
//! 5. Merge-diff over both snapshots
//! 6. Report write (temp file, then rename)
//!
//! Every run carries a [`RequestId`] which is logged at start/end and
//! attached to any error returned.

#![allow(clippy::result_large_err)]

use ledgerutil_core::config::{validate_snapshot_paths, CompareOptions};
use ledgerutil_core::diff::{compare_sources, ComparisonResult, SourceComparison};
use ledgerutil_core::errors::ExError;
use ledgerutil_core::{log_op_end, log_op_error, log_op_start};
use ledgerutil_core_types::{RequestContext, RequestId};
use ledgerutil_store::errors::Result;
use ledgerutil_store::report::write_report;
use ledgerutil_store::snapshot::FsSnapshot;
use std::path::{Path, PathBuf};

/// Outcome of a comparison run.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareOutcome {
    /// Both public state hashes are equal; no entries were read and no
    /// report was written.
    Identical,
    /// The merge ran; the report is at `report_path`. Zero differences is
    /// possible when the recorded hashes are flawed.
    Compared {
        report_path: PathBuf,
        result: ComparisonResult,
    },
}

impl CompareOutcome {
    /// Difference count on the integer contract: `-1` for identical
    pub fn difference_count(&self) -> i64 {
        match self {
            CompareOutcome::Identical => -1,
            CompareOutcome::Compared { result, .. } => {
                i64::try_from(result.total_difference_count).unwrap_or(i64::MAX)
            }
        }
    }

    pub fn report_path(&self) -> Option<&Path> {
        match self {
            CompareOutcome::Identical => None,
            CompareOutcome::Compared { report_path, .. } => Some(report_path),
        }
    }
}

/// Compare two snapshot directories.
///
/// # Errors
///
/// - `InvalidConfig` for empty snapshot paths, before any I/O
/// - `Io` when a snapshot directory or the output directory is inaccessible
/// - any `Format` kind raised while reading either snapshot
/// - `IncomparableSnapshots` when channel or height differ
///
/// The returned error carries the run's request id.
pub fn compare_snapshots(
    first: &Path,
    second: &Path,
    options: &CompareOptions,
) -> Result<CompareOutcome> {
    compare_snapshots_with_context(first, second, options, RequestContext::new())
}

/// Same as [`compare_snapshots`] with a caller-supplied request context
pub fn compare_snapshots_with_context(
    first: &Path,
    second: &Path,
    options: &CompareOptions,
    ctx: RequestContext,
) -> Result<CompareOutcome> {
    let request_id = ctx.request_id.clone();
    log_op_start!(
        "compare_snapshots",
        request_id = request_id.as_str(),
        first = %first.display(),
        second = %second.display(),
        sample_limit = options.sample_limit
    );

    let outcome = compare_snapshots_impl(first, second, options).map_err(|e| {
        let e = e.with_request_id(request_id.clone());
        log_op_error!(
            "compare_snapshots",
            &e,
            duration_ms = ctx.elapsed_ms(),
            request_id = request_id.as_str()
        );
        e
    })?;

    log_op_end!(
        "compare_snapshots",
        duration_ms = ctx.elapsed_ms(),
        request_id = request_id.as_str(),
        diff_count = outcome.difference_count()
    );

    Ok(outcome)
}

fn compare_snapshots_impl(
    first: &Path,
    second: &Path,
    options: &CompareOptions,
) -> Result<CompareOutcome> {
    validate_snapshot_paths(first, second)?;

    let first = FsSnapshot::open(first)?;
    let second = FsSnapshot::open(second)?;

    match compare_sources(&first, &second, options.sample_limit)? {
        SourceComparison::Identical => Ok(CompareOutcome::Identical),
        SourceComparison::Diverged(result) => {
            let report_path = write_report(&result, &options.output_dir)?;
            Ok(CompareOutcome::Compared {
                report_path,
                result,
            })
        }
    }
}

/// Integer contract over [`compare_snapshots`].
///
/// Returns `(-1, None)` when the public state hashes are equal and
/// `(count, Some(report_path))` otherwise.
///
/// # Errors
///
/// `InvalidConfig` when `first_diffs` is negative, plus every error of
/// [`compare_snapshots`].
pub fn compare(
    first: &Path,
    second: &Path,
    output_dir: &Path,
    first_diffs: i64,
) -> Result<(i64, Option<PathBuf>)> {
    let options = CompareOptions::from_first_diffs(output_dir, first_diffs).map_err(|e| {
        ExError::from(e)
            .with_op("compare")
            .with_request_id(RequestId::new())
    })?;
    let outcome = compare_snapshots(first, second, &options)?;
    let count = outcome.difference_count();
    Ok((count, outcome.report_path().map(Path::to_path_buf)))
}
