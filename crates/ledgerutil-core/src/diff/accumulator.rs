//! Difference accumulation: exact counters plus a bounded sample.

use crate::diff::model::{
    ComparisonResult, DiffCounts, DiffKind, DiffRecord, RecordSide, SnapshotIdentity,
};
use crate::snapshot::model::Entry;
use std::collections::BTreeMap;

/// Collects merge emissions.
///
/// Counting and sampling are independent: every emission is counted, but only
/// the first `sample_limit` emissions are kept.
#[derive(Debug)]
pub struct DiffAccumulator {
    sample_limit: usize,
    counts: DiffCounts,
    namespace_counts: BTreeMap<String, DiffCounts>,
    sample: Vec<DiffRecord>,
}

impl DiffAccumulator {
    pub fn new(sample_limit: usize) -> Self {
        Self {
            sample_limit,
            counts: DiffCounts::default(),
            namespace_counts: BTreeMap::new(),
            sample: Vec::new(),
        }
    }

    /// Record one difference. `first`/`second` are the entries on each side, if any.
    pub fn record(
        &mut self,
        namespace: &str,
        kind: DiffKind,
        first: Option<Entry>,
        second: Option<Entry>,
    ) {
        self.counts.record(kind);
        match self.namespace_counts.get_mut(namespace) {
            Some(counts) => counts.record(kind),
            None => {
                let mut counts = DiffCounts::default();
                counts.record(kind);
                self.namespace_counts.insert(namespace.to_string(), counts);
            }
        }

        if self.sample_full() {
            return;
        }
        let key = match (&first, &second) {
            (Some(entry), _) | (None, Some(entry)) => entry.key.clone(),
            (None, None) => Vec::new(),
        };
        self.sample.push(DiffRecord {
            namespace: namespace.to_string(),
            key,
            kind,
            first: first.map(RecordSide::from),
            second: second.map(RecordSide::from),
        });
    }

    fn sample_full(&self) -> bool {
        self.sample.len() >= self.sample_limit
    }

    pub fn total(&self) -> u64 {
        self.counts.total()
    }

    pub fn into_result(self, first: SnapshotIdentity, second: SnapshotIdentity) -> ComparisonResult {
        let total = self.counts.total();
        ComparisonResult {
            first,
            second,
            identical: total == 0,
            total_difference_count: total,
            counts: self.counts,
            namespace_counts: self.namespace_counts,
            sample_limit: self.sample_limit,
            sampled_differences: self.sample,
        }
    }
}
