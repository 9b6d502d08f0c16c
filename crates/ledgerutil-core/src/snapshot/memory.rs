//! In-memory [`SnapshotSource`], mainly for tests and tooling.
//!
//! Entries are kept exactly as supplied, unsorted input included, and are
//! served through the same [`CheckedEntries`] adapter as on-disk snapshots.

use crate::errors::{ExError, Result};
use crate::snapshot::checked::CheckedEntries;
use crate::snapshot::digest::{namespace_digest, public_state_hash};
use crate::snapshot::model::{Entry, HexBytes, NamespaceDescriptor, SnapshotMetadata};
use crate::snapshot::source::{EntryStream, SnapshotSource};
use crate::snapshot::FORMAT_VERSION;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    label: String,
    metadata: SnapshotMetadata,
    data: BTreeMap<String, Vec<Entry>>,
    hash_override: Option<HexBytes>,
    namespace_digests: bool,
}

impl MemorySnapshot {
    pub fn new(
        label: impl Into<String>,
        channel_name: impl Into<String>,
        last_block_number: u64,
    ) -> Self {
        let mut snapshot = Self {
            label: label.into(),
            metadata: SnapshotMetadata {
                format_version: FORMAT_VERSION,
                channel_name: channel_name.into(),
                last_block_number,
                last_block_hash: HexBytes::default(),
                previous_block_hash: HexBytes::default(),
                state_db_type: None,
                public_state_hash: HexBytes::default(),
                namespaces: Vec::new(),
            },
            data: BTreeMap::new(),
            hash_override: None,
            namespace_digests: true,
        };
        snapshot.rebuild_metadata();
        snapshot
    }

    /// Add (or replace) a namespace with entries in the given order
    pub fn with_namespace(mut self, name: impl Into<String>, entries: Vec<Entry>) -> Self {
        self.data.insert(name.into(), entries);
        self.rebuild_metadata();
        self
    }

    /// Force a public state hash instead of the computed one
    pub fn with_public_state_hash(mut self, hash: HexBytes) -> Self {
        self.hash_override = Some(hash);
        self.rebuild_metadata();
        self
    }

    /// Omit per-namespace digests from the descriptors
    pub fn without_namespace_digests(mut self) -> Self {
        self.namespace_digests = false;
        self.rebuild_metadata();
        self
    }

    fn rebuild_metadata(&mut self) {
        let digests: Vec<(String, HexBytes)> = self
            .data
            .iter()
            .map(|(name, entries)| (name.clone(), namespace_digest(entries)))
            .collect();

        self.metadata.namespaces = digests
            .iter()
            .map(|(name, digest)| NamespaceDescriptor {
                name: name.clone(),
                file: format!("memory/{}", name),
                entry_count: self.data.get(name).map(|e| e.len() as u64),
                digest: self.namespace_digests.then(|| digest.clone()),
            })
            .collect();

        self.metadata.public_state_hash = match &self.hash_override {
            Some(hash) => hash.clone(),
            None => public_state_hash(digests.iter().map(|(n, d)| (n.as_str(), d))),
        };
    }
}

impl SnapshotSource for MemorySnapshot {
    fn label(&self) -> &str {
        &self.label
    }

    fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    fn entries(&self, namespace: &str) -> Result<EntryStream<'_>> {
        let descriptor = self.descriptor(namespace)?;
        let entries = self.data.get(namespace).map(Vec::as_slice).unwrap_or(&[]);
        Ok(Box::new(CheckedEntries::new(
            entries.iter().cloned().map(Ok::<Entry, ExError>),
            self.label.clone(),
            descriptor,
        )))
    }
}
