//! Comparison output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Collections use `BTreeMap` and ordered `Vec` for deterministic serialization.

use crate::snapshot::model::{printable_utf8, Entry, HexBytes, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Classification of one divergence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiffKind {
    /// Key exists only in the first snapshot
    OnlyInFirst,
    /// Key exists only in the second snapshot
    OnlyInSecond,
    /// Key exists in both with different values
    ValueDiffers,
}

/// One side of a divergent key
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordSide {
    #[serde(with = "rendered_bytes")]
    pub value: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Version>,
}

impl From<Entry> for RecordSide {
    fn from(entry: Entry) -> Self {
        Self {
            value: entry.value,
            version: entry.version,
        }
    }
}

/// A single detected divergence. `first`/`second` are `None` when the key is
/// absent on that side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffRecord {
    pub namespace: String,
    #[serde(with = "rendered_bytes")]
    pub key: Vec<u8>,
    pub kind: DiffKind,
    pub first: Option<RecordSide>,
    pub second: Option<RecordSide>,
}

/// Divergence counts split by kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffCounts {
    pub only_in_first: u64,
    pub only_in_second: u64,
    pub value_differs: u64,
}

impl DiffCounts {
    pub fn record(&mut self, kind: DiffKind) {
        match kind {
            DiffKind::OnlyInFirst => self.only_in_first += 1,
            DiffKind::OnlyInSecond => self.only_in_second += 1,
            DiffKind::ValueDiffers => self.value_differs += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.only_in_first + self.only_in_second + self.value_differs
    }
}

/// Identity of one compared snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotIdentity {
    /// Label the snapshot was opened with (usually its path)
    pub label: String,
    pub channel_name: String,
    pub height: u64,
    pub last_block_hash: HexBytes,
    pub public_state_hash: HexBytes,
}

/// Aggregate result of a merge-diff run.
///
/// `total_difference_count` is exact; `sampled_differences` holds at most
/// `sample_limit` records in merge order (ascending namespace, then key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub first: SnapshotIdentity,
    pub second: SnapshotIdentity,
    /// True when the merge found no differences at all
    pub identical: bool,
    pub total_difference_count: u64,
    pub counts: DiffCounts,
    /// Per-namespace counts; namespaces without differences are omitted
    pub namespace_counts: BTreeMap<String, DiffCounts>,
    pub sample_limit: usize,
    pub sampled_differences: Vec<DiffRecord>,
}

/// Serde adapter rendering byte strings as `{"hex": "...", "utf8": "..."}`.
///
/// `hex` is always present and authoritative; `utf8` is added when the bytes
/// are printable UTF-8.
pub mod rendered_bytes {
    use super::printable_utf8;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Rendered {
        hex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        utf8: Option<String>,
    }

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        Rendered {
            hex: hex::encode(bytes),
            utf8: printable_utf8(bytes).map(str::to_string),
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let rendered = Rendered::deserialize(deserializer)?;
        hex::decode(&rendered.hex).map_err(serde::de::Error::custom)
    }
}
