//! Snapshot directory writer.
//!
//! Builds a snapshot in memory and writes it in the on-disk format read by
//! [`FsSnapshot`](crate::snapshot::FsSnapshot). Entries are kept in `BTreeMap`s,
//! so data files always come out sorted and digests always match content
//! unless explicitly overridden.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, serialization_error, Result};
use crate::report::atomic::atomic_write;
use crate::snapshot::reader::encode_entry_line;
use ledgerutil_core::snapshot::digest::{public_state_hash, NamespaceHasher};
use ledgerutil_core::snapshot::{
    Entry, HexBytes, NamespaceDescriptor, SnapshotMetadata, Version, FORMAT_VERSION,
    METADATA_FILE_NAME, PUBLIC_STATE_DIR,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

type NamespaceData = BTreeMap<Vec<u8>, (Vec<u8>, Option<Version>)>;

#[derive(Debug, Clone)]
pub struct SnapshotExporter {
    channel_name: String,
    last_block_number: u64,
    last_block_hash: HexBytes,
    previous_block_hash: HexBytes,
    state_db_type: Option<String>,
    namespaces: BTreeMap<String, NamespaceData>,
    hash_override: Option<HexBytes>,
    namespace_digests: bool,
}

impl SnapshotExporter {
    pub fn new(channel_name: impl Into<String>, last_block_number: u64) -> Self {
        Self {
            channel_name: channel_name.into(),
            last_block_number,
            last_block_hash: HexBytes::new(last_block_number.to_be_bytes().to_vec()),
            previous_block_hash: HexBytes::new(
                last_block_number.saturating_sub(1).to_be_bytes().to_vec(),
            ),
            state_db_type: Some("leveldb".to_string()),
            namespaces: BTreeMap::new(),
            hash_override: None,
            namespace_digests: true,
        }
    }

    pub fn with_block_hashes(mut self, last: HexBytes, previous: HexBytes) -> Self {
        self.last_block_hash = last;
        self.previous_block_hash = previous;
        self
    }

    pub fn with_state_db_type(mut self, state_db_type: Option<String>) -> Self {
        self.state_db_type = state_db_type;
        self
    }

    /// Declare a namespace, possibly without any entries
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.entry(namespace.into()).or_default();
        self
    }

    /// Insert or overwrite one key
    pub fn put(
        self,
        namespace: impl Into<String>,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        self.insert(namespace.into(), key.into(), value.into(), None)
    }

    /// Insert or overwrite one key with its write version
    pub fn put_versioned(
        self,
        namespace: impl Into<String>,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
        block_num: u64,
        tx_num: u64,
    ) -> Self {
        let version = Version { block_num, tx_num };
        self.insert(namespace.into(), key.into(), value.into(), Some(version))
    }

    fn insert(
        mut self,
        namespace: String,
        key: Vec<u8>,
        value: Vec<u8>,
        version: Option<Version>,
    ) -> Self {
        self.namespaces
            .entry(namespace)
            .or_default()
            .insert(key, (value, version));
        self
    }

    /// Record this public state hash instead of the computed one
    pub fn with_public_state_hash(mut self, hash: HexBytes) -> Self {
        self.hash_override = Some(hash);
        self
    }

    /// Leave `digest` out of the namespace descriptors
    pub fn without_namespace_digests(mut self) -> Self {
        self.namespace_digests = false;
        self
    }

    /// Write the snapshot into `dir`, which is created if absent.
    ///
    /// Data files are written first and the metadata last, so a directory
    /// without metadata is never mistaken for a complete snapshot.
    ///
    /// # Errors
    ///
    /// `Io` on any filesystem failure.
    pub fn export(&self, dir: &Path) -> Result<SnapshotMetadata> {
        let data_dir = dir.join(PUBLIC_STATE_DIR);
        fs::create_dir_all(&data_dir).map_err(|e| io_error("export_snapshot", e))?;

        let mut descriptors = Vec::with_capacity(self.namespaces.len());
        let mut digests = Vec::with_capacity(self.namespaces.len());
        for (index, (name, data)) in self.namespaces.iter().enumerate() {
            let file = format!("{}/ns-{:05}.jsonl", PUBLIC_STATE_DIR, index);
            let mut hasher = NamespaceHasher::new();
            let mut content = String::new();
            for (key, (value, version)) in data {
                hasher.update(key, value);
                let entry = Entry {
                    key: key.clone(),
                    value: value.clone(),
                    version: *version,
                };
                content.push_str(&encode_entry_line(&entry)?);
                content.push('\n');
            }
            fs::write(dir.join(&file), content).map_err(|e| io_error("export_snapshot", e))?;

            let digest = hasher.finalize();
            descriptors.push(NamespaceDescriptor {
                name: name.clone(),
                file,
                entry_count: Some(data.len() as u64),
                digest: self.namespace_digests.then(|| digest.clone()),
            });
            digests.push((name.as_str(), digest));
        }

        let computed = public_state_hash(digests.iter().map(|(n, d)| (*n, d)));
        let metadata = SnapshotMetadata {
            format_version: FORMAT_VERSION,
            channel_name: self.channel_name.clone(),
            last_block_number: self.last_block_number,
            last_block_hash: self.last_block_hash.clone(),
            previous_block_hash: self.previous_block_hash.clone(),
            state_db_type: self.state_db_type.clone(),
            public_state_hash: self.hash_override.clone().unwrap_or(computed),
            namespaces: descriptors,
        };

        let bytes = serde_json::to_vec_pretty(&metadata)
            .map_err(|e| serialization_error("export_snapshot", e))?;
        atomic_write(&dir.join(METADATA_FILE_NAME), &bytes)?;

        tracing::debug!(
            snapshot = %dir.display(),
            namespaces = metadata.namespaces.len(),
            "snapshot exported"
        );
        Ok(metadata)
    }
}
