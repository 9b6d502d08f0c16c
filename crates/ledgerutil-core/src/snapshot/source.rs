//! The read interface the comparison engine consumes.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::snapshot::model::{Entry, HexBytes, NamespaceDescriptor, SnapshotMetadata};

/// Lazy, single-pass stream of entries in ascending key order
pub type EntryStream<'a> = Box<dyn Iterator<Item = Result<Entry>> + 'a>;

/// A readable snapshot.
///
/// Implementations own all decoding state for their snapshot. Entry streams
/// must be forward-only and must not materialize the namespace; they are
/// expected to be wrapped in [`CheckedEntries`](crate::snapshot::CheckedEntries)
/// so that ordering is verified during iteration.
pub trait SnapshotSource {
    /// Human-readable identity used in errors and reports (usually the path)
    fn label(&self) -> &str;

    /// Validated snapshot metadata
    fn metadata(&self) -> &SnapshotMetadata;

    /// Stream the entries of one namespace.
    ///
    /// # Errors
    ///
    /// `NamespaceNotFound` when the namespace is not in the metadata; any
    /// error opening the underlying data.
    fn entries(&self, namespace: &str) -> Result<EntryStream<'_>>;

    /// Top-level state digest, read from metadata without scanning data
    fn public_state_hash(&self) -> &HexBytes {
        &self.metadata().public_state_hash
    }

    /// Namespace names in ascending order. Each call starts a fresh pass.
    fn namespaces(&self) -> NamespaceNames<'_> {
        NamespaceNames(self.metadata().namespaces.iter())
    }

    /// Descriptor of one namespace.
    ///
    /// # Errors
    ///
    /// `NamespaceNotFound` when the namespace is not in the metadata.
    fn descriptor(&self, namespace: &str) -> Result<&NamespaceDescriptor> {
        self.metadata()
            .namespace(namespace)
            .ok_or_else(|| namespace_not_found(self.label(), namespace))
    }
}

/// Iterator over namespace names of a snapshot
pub struct NamespaceNames<'a>(std::slice::Iter<'a, NamespaceDescriptor>);

impl<'a> Iterator for NamespaceNames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|d| d.name.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

pub fn namespace_not_found(label: &str, namespace: &str) -> ExError {
    ExError::new(ExErrorKind::NamespaceNotFound)
        .with_op("read_entries")
        .with_snapshot(label)
        .with_namespace(namespace)
        .with_message("namespace is not present in the snapshot metadata")
}
