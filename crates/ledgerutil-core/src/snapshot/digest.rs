//! Digest construction and comparison for snapshot state.
//!
//! ## Digest Types
//!
//! - **Namespace digest**: SHA-256 over every entry of a namespace in key
//!   order, each as `u64be(len key) ‖ key ‖ u64be(len value) ‖ value`
//! - **Public state hash**: SHA-256 over every namespace in name order, each
//!   as `u64be(len name) ‖ name ‖ namespace digest`
//!
//! Length prefixes keep the encoding unambiguous. Entry versions are not
//! hashed: two snapshots holding the same keys and values have the same
//! public state hash whatever blocks wrote them.

use crate::snapshot::model::{Entry, HexBytes};
use sha2::{Digest, Sha256};

fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_be_bytes());
    hasher.update(bytes);
}

/// Incremental namespace digest, fed one entry at a time
#[derive(Clone, Default)]
pub struct NamespaceHasher {
    hasher: Sha256,
}

impl NamespaceHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key: &[u8], value: &[u8]) {
        update_prefixed(&mut self.hasher, key);
        update_prefixed(&mut self.hasher, value);
    }

    pub fn finalize(self) -> HexBytes {
        HexBytes::new(self.hasher.finalize().to_vec())
    }
}

/// Digest of a complete namespace
pub fn namespace_digest<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> HexBytes {
    let mut hasher = NamespaceHasher::new();
    for entry in entries {
        hasher.update(&entry.key, &entry.value);
    }
    hasher.finalize()
}

/// Public state hash from `(namespace name, namespace digest)` pairs in name order
pub fn public_state_hash<'a>(
    namespaces: impl IntoIterator<Item = (&'a str, &'a HexBytes)>,
) -> HexBytes {
    let mut hasher = Sha256::new();
    for (name, digest) in namespaces {
        update_prefixed(&mut hasher, name.as_bytes());
        hasher.update(digest.as_bytes());
    }
    HexBytes::new(hasher.finalize().to_vec())
}

/// Outcome of comparing two public state hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestVerdict {
    /// Hashes are byte-equal: the snapshots hold identical state
    Equal,
    /// Hashes differ: a full merge is needed to locate divergences
    Different,
}

/// Byte equality on two public state hashes.
pub fn compare_digests(first: &HexBytes, second: &HexBytes) -> DigestVerdict {
    if first.as_bytes() == second.as_bytes() {
        DigestVerdict::Equal
    } else {
        DigestVerdict::Different
    }
}
