//! Two-level ordered merge over a pair of snapshots.
//!
//! The outer merge walks namespace names of both snapshots in ascending
//! order; the inner merge walks the keys of a shared namespace in lock-step.
//! Both sides are consumed as forward-only streams, so memory use does not
//! grow with snapshot size (only the bounded sample is retained).

#![allow(clippy::result_large_err)]

use crate::diff::accumulator::DiffAccumulator;
use crate::diff::model::{ComparisonResult, DiffKind, SnapshotIdentity};
use crate::errors::Result;
use crate::snapshot::digest::{compare_digests, DigestVerdict};
use crate::snapshot::metadata::ensure_comparable;
use crate::snapshot::model::Entry;
use crate::snapshot::source::SnapshotSource;
use crate::{log_op_end, log_op_error, log_op_start};
use std::cmp::Ordering;
use std::time::Instant;

/// Outcome of comparing two sources end to end
#[derive(Debug, Clone, PartialEq)]
pub enum SourceComparison {
    /// Public state hashes are equal; no entries were read
    Identical,
    /// Hashes differ; the merge ran (and may still have found zero differences)
    Diverged(ComparisonResult),
}

/// Which snapshot a one-sided namespace belongs to
#[derive(Debug, Clone, Copy)]
enum Side {
    First,
    Second,
}

impl Side {
    fn kind(self) -> DiffKind {
        match self {
            Side::First => DiffKind::OnlyInFirst,
            Side::Second => DiffKind::OnlyInSecond,
        }
    }
}

/// Identity of a source as recorded in the comparison result
pub fn snapshot_identity<S: SnapshotSource + ?Sized>(source: &S) -> SnapshotIdentity {
    let metadata = source.metadata();
    SnapshotIdentity {
        label: source.label().to_string(),
        channel_name: metadata.channel_name.clone(),
        height: metadata.height(),
        last_block_hash: metadata.last_block_hash.clone(),
        public_state_hash: metadata.public_state_hash.clone(),
    }
}

/// Comparability check, digest comparison, then merge if needed.
///
/// # Errors
///
/// - `IncomparableSnapshots` when channel or height differ
/// - any error raised while streaming entries (see [`merge_diff`])
pub fn compare_sources<A, B>(first: &A, second: &B, sample_limit: usize) -> Result<SourceComparison>
where
    A: SnapshotSource + ?Sized,
    B: SnapshotSource + ?Sized,
{
    ensure_comparable(
        first.label(),
        first.metadata(),
        second.label(),
        second.metadata(),
    )?;

    match compare_digests(first.public_state_hash(), second.public_state_hash()) {
        DigestVerdict::Equal => {
            tracing::debug!(
                public_state_hash = %first.public_state_hash(),
                "public state hashes are equal, skipping merge"
            );
            Ok(SourceComparison::Identical)
        }
        DigestVerdict::Different => {
            merge_diff(first, second, sample_limit).map(SourceComparison::Diverged)
        }
    }
}

/// Merge both snapshots and collect every difference.
///
/// The result's total is exact; at most `sample_limit` records are kept, in
/// ascending (namespace, key) order.
///
/// # Errors
///
/// Any error from either entry stream aborts the merge: ordering violations,
/// malformed lines, count or digest mismatches, missing data files.
pub fn merge_diff<A, B>(first: &A, second: &B, sample_limit: usize) -> Result<ComparisonResult>
where
    A: SnapshotSource + ?Sized,
    B: SnapshotSource + ?Sized,
{
    log_op_start!("merge_diff", sample_limit = sample_limit);
    let start = Instant::now();

    let result = merge_diff_impl(first, second, sample_limit).map_err(|e| {
        log_op_error!(
            "merge_diff",
            &e,
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "merge_diff",
        duration_ms = start.elapsed().as_millis() as u64,
        diff_count = result.total_difference_count,
        sample_len = result.sampled_differences.len()
    );

    Ok(result)
}

fn merge_diff_impl<A, B>(first: &A, second: &B, sample_limit: usize) -> Result<ComparisonResult>
where
    A: SnapshotSource + ?Sized,
    B: SnapshotSource + ?Sized,
{
    let mut acc = DiffAccumulator::new(sample_limit);
    let mut first_names = first.namespaces().peekable();
    let mut second_names = second.namespaces().peekable();

    loop {
        match (first_names.peek().copied(), second_names.peek().copied()) {
            (None, None) => break,
            (Some(ns), None) => {
                drain_namespace(first, ns, Side::First, &mut acc)?;
                first_names.next();
            }
            (None, Some(ns)) => {
                drain_namespace(second, ns, Side::Second, &mut acc)?;
                second_names.next();
            }
            (Some(a), Some(b)) => match a.as_bytes().cmp(b.as_bytes()) {
                Ordering::Less => {
                    drain_namespace(first, a, Side::First, &mut acc)?;
                    first_names.next();
                }
                Ordering::Greater => {
                    drain_namespace(second, b, Side::Second, &mut acc)?;
                    second_names.next();
                }
                Ordering::Equal => {
                    merge_namespace(first, second, a, &mut acc)?;
                    first_names.next();
                    second_names.next();
                }
            },
        }
    }

    Ok(acc.into_result(snapshot_identity(first), snapshot_identity(second)))
}

/// Emit every entry of a namespace present on one side only
fn drain_namespace<S: SnapshotSource + ?Sized>(
    source: &S,
    namespace: &str,
    side: Side,
    acc: &mut DiffAccumulator,
) -> Result<()> {
    let before = acc.total();
    for entry in source.entries(namespace)? {
        let entry = entry?;
        match side {
            Side::First => acc.record(namespace, side.kind(), Some(entry), None),
            Side::Second => acc.record(namespace, side.kind(), None, Some(entry)),
        }
    }
    tracing::debug!(
        namespace,
        side = ?side,
        diff_count = acc.total() - before,
        "namespace present in one snapshot only"
    );
    Ok(())
}

/// Lock-step merge of one namespace present in both snapshots
fn merge_namespace<A, B>(
    first: &A,
    second: &B,
    namespace: &str,
    acc: &mut DiffAccumulator,
) -> Result<()>
where
    A: SnapshotSource + ?Sized,
    B: SnapshotSource + ?Sized,
{
    // Recorded digests are verified by the streams, never trusted up front.
    let before = acc.total();
    let mut left = first.entries(namespace)?;
    let mut right = second.entries(namespace)?;
    let mut l: Option<Entry> = left.next().transpose()?;
    let mut r: Option<Entry> = right.next().transpose()?;

    loop {
        match (l.take(), r.take()) {
            (None, None) => break,
            (Some(a), None) => {
                acc.record(namespace, DiffKind::OnlyInFirst, Some(a), None);
                l = left.next().transpose()?;
            }
            (None, Some(b)) => {
                acc.record(namespace, DiffKind::OnlyInSecond, None, Some(b));
                r = right.next().transpose()?;
            }
            (Some(a), Some(b)) => match a.key.cmp(&b.key) {
                Ordering::Less => {
                    acc.record(namespace, DiffKind::OnlyInFirst, Some(a), None);
                    l = left.next().transpose()?;
                    r = Some(b);
                }
                Ordering::Greater => {
                    acc.record(namespace, DiffKind::OnlyInSecond, None, Some(b));
                    r = right.next().transpose()?;
                    l = Some(a);
                }
                Ordering::Equal => {
                    if a.value != b.value {
                        acc.record(namespace, DiffKind::ValueDiffers, Some(a), Some(b));
                    }
                    l = left.next().transpose()?;
                    r = right.next().transpose()?;
                }
            },
        }
    }

    tracing::debug!(
        namespace,
        diff_count = acc.total() - before,
        "namespace merged"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use crate::snapshot::memory::MemorySnapshot;
    use crate::snapshot::model::HexBytes;

    fn chaincode_pair() -> (MemorySnapshot, MemorySnapshot) {
        let a = MemorySnapshot::new("a", "mychannel", 9).with_namespace(
            "chaincode1",
            vec![Entry::new("k1", "v1"), Entry::new("k2", "v2")],
        );
        let b = MemorySnapshot::new("b", "mychannel", 9).with_namespace(
            "chaincode1",
            vec![
                Entry::new("k1", "v1"),
                Entry::new("k2", "v9"),
                Entry::new("k3", "v3"),
            ],
        );
        (a, b)
    }

    #[test]
    fn test_chaincode_scenario() {
        let (a, b) = chaincode_pair();
        let result = merge_diff(&a, &b, 10).unwrap();
        assert_eq!(result.total_difference_count, 2);
        assert_eq!(result.sampled_differences.len(), 2);

        let first = &result.sampled_differences[0];
        assert_eq!(first.kind, DiffKind::ValueDiffers);
        assert_eq!(first.key, b"k2");
        assert_eq!(first.first.as_ref().unwrap().value, b"v2");
        assert_eq!(first.second.as_ref().unwrap().value, b"v9");

        let second = &result.sampled_differences[1];
        assert_eq!(second.kind, DiffKind::OnlyInSecond);
        assert_eq!(second.key, b"k3");
        assert!(second.first.is_none());
    }

    #[test]
    fn test_namespace_only_in_first() {
        let a = MemorySnapshot::new("a", "ch", 1)
            .with_namespace("alpha", vec![Entry::new("x", "1"), Entry::new("y", "2")])
            .with_namespace("beta", vec![Entry::new("k", "v")]);
        let b = MemorySnapshot::new("b", "ch", 1).with_namespace("beta", vec![Entry::new("k", "v")]);

        let result = merge_diff(&a, &b, 10).unwrap();
        assert_eq!(result.total_difference_count, 2);
        assert_eq!(result.counts.only_in_first, 2);
        assert!(result
            .sampled_differences
            .iter()
            .all(|d| d.namespace == "alpha" && d.kind == DiffKind::OnlyInFirst));
    }

    #[test]
    fn test_namespace_only_in_second_after_shared() {
        let a = MemorySnapshot::new("a", "ch", 1).with_namespace("a", vec![Entry::new("k", "v")]);
        let b = MemorySnapshot::new("b", "ch", 1)
            .with_namespace("a", vec![Entry::new("k", "v")])
            .with_namespace("z", vec![Entry::new("k", "v")]);
        let result = merge_diff(&a, &b, 10).unwrap();
        assert_eq!(result.total_difference_count, 1);
        assert_eq!(result.sampled_differences[0].namespace, "z");
        assert_eq!(result.sampled_differences[0].kind, DiffKind::OnlyInSecond);
    }

    #[test]
    fn test_sample_limit_does_not_change_total() {
        let (a, b) = chaincode_pair();
        let limited = merge_diff(&a, &b, 1).unwrap();
        let empty = merge_diff(&a, &b, 0).unwrap();
        assert_eq!(limited.total_difference_count, 2);
        assert_eq!(limited.sampled_differences.len(), 1);
        assert_eq!(empty.total_difference_count, 2);
        assert!(empty.sampled_differences.is_empty());
    }

    #[test]
    fn test_out_of_order_keys_fail() {
        let a = MemorySnapshot::new("a", "ch", 1).with_namespace(
            "ns",
            vec![Entry::new("b", "1"), Entry::new("a", "1")],
        );
        let b = MemorySnapshot::new("b", "ch", 1).with_namespace("ns", vec![Entry::new("a", "1")]);
        let err = merge_diff(&a, &b, 10).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
        assert_eq!(err.snapshot(), Some("a"));
    }

    #[test]
    fn test_equal_namespace_digests_still_verify_order() {
        let entries = vec![Entry::new("b", "1"), Entry::new("a", "1")];
        let a = MemorySnapshot::new("a", "ch", 1).with_namespace("ns", entries.clone());
        let b = MemorySnapshot::new("b", "ch", 1)
            .with_namespace("ns", entries)
            .with_public_state_hash(HexBytes::new(vec![9]));
        let err = merge_diff(&a, &b, 10).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
    }

    #[test]
    fn test_compare_sources_identical() {
        let (a, _) = chaincode_pair();
        let copy = a.clone();
        assert_eq!(
            compare_sources(&a, &copy, 10).unwrap(),
            SourceComparison::Identical
        );
    }

    #[test]
    fn test_compare_sources_flawed_digest_still_merges() {
        let (a, _) = chaincode_pair();
        let b = a.clone().with_public_state_hash(HexBytes::new(vec![0xee; 32]));
        match compare_sources(&a, &b, 10).unwrap() {
            SourceComparison::Diverged(result) => {
                assert_eq!(result.total_difference_count, 0);
                assert!(result.identical);
            }
            SourceComparison::Identical => panic!("expected a merge to run"),
        }
    }

    #[test]
    fn test_compare_sources_incomparable() {
        let a = MemorySnapshot::new("a", "ch1", 1);
        let b = MemorySnapshot::new("b", "ch2", 1);
        let err = compare_sources(&a, &b, 10).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::IncomparableSnapshots);
    }
}
