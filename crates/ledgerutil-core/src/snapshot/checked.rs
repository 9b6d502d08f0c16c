//! Integrity-checking adapter over a namespace entry stream.
//!
//! [`CheckedEntries`] wraps any fallible entry iterator and enforces, as a
//! side effect of iteration:
//!
//! - keys strictly ascending (byte-lexicographic), so duplicates fail too
//! - on exhaustion, the recorded `entry_count` and `digest` if present
//!
//! The adapter is fused after the first error.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::snapshot::digest::NamespaceHasher;
use crate::snapshot::model::{display_bytes, Entry, HexBytes, NamespaceDescriptor};

pub struct CheckedEntries<I> {
    inner: I,
    snapshot: String,
    namespace: String,
    previous_key: Option<Vec<u8>>,
    position: u64,
    hasher: Option<NamespaceHasher>,
    expected_count: Option<u64>,
    expected_digest: Option<HexBytes>,
    done: bool,
}

impl<I> CheckedEntries<I>
where
    I: Iterator<Item = Result<Entry>>,
{
    pub fn new(inner: I, snapshot: impl Into<String>, descriptor: &NamespaceDescriptor) -> Self {
        Self {
            inner,
            snapshot: snapshot.into(),
            namespace: descriptor.name.clone(),
            previous_key: None,
            position: 0,
            hasher: descriptor.digest.as_ref().map(|_| NamespaceHasher::new()),
            expected_count: descriptor.entry_count,
            expected_digest: descriptor.digest.clone(),
            done: false,
        }
    }

    fn error(&self, kind: ExErrorKind, message: String) -> ExError {
        ExError::new(kind)
            .with_op("read_entries")
            .with_snapshot(self.snapshot.clone())
            .with_namespace(self.namespace.clone())
            .with_message(message)
    }

    fn check_order(&self, entry: &Entry) -> Result<()> {
        let Some(previous) = &self.previous_key else {
            return Ok(());
        };
        if entry.key.as_slice() > previous.as_slice() {
            return Ok(());
        }
        let message = if entry.key == *previous {
            format!("duplicate key {}", display_bytes(&entry.key))
        } else {
            format!(
                "key {} sorts before previous key {}",
                display_bytes(&entry.key),
                display_bytes(previous)
            )
        };
        Err(self
            .error(ExErrorKind::OrderingViolation, message)
            .with_location(format!("entry {}", self.position)))
    }

    fn check_end_of_stream(&mut self) -> Result<()> {
        if let Some(expected) = self.expected_count {
            if expected != self.position {
                return Err(self.error(
                    ExErrorKind::EntryCountMismatch,
                    format!(
                        "metadata records {} entries but the stream holds {}",
                        expected, self.position
                    ),
                ));
            }
        }
        if let (Some(hasher), Some(expected)) = (self.hasher.take(), &self.expected_digest) {
            let actual = hasher.finalize();
            if actual != *expected {
                return Err(self.error(
                    ExErrorKind::DigestMismatch,
                    format!(
                        "namespace digest mismatch: metadata records {} but content hashes to {}",
                        expected, actual
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl<I> Iterator for CheckedEntries<I>
where
    I: Iterator<Item = Result<Entry>>,
{
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let entry = match self.inner.next() {
            None => {
                self.done = true;
                return self.check_end_of_stream().err().map(Err);
            }
            Some(Err(e)) => {
                self.done = true;
                return Some(Err(e));
            }
            Some(Ok(entry)) => entry,
        };

        self.position += 1;
        if let Err(e) = self.check_order(&entry) {
            self.done = true;
            return Some(Err(e));
        }
        if let Some(hasher) = self.hasher.as_mut() {
            hasher.update(&entry.key, &entry.value);
        }
        self.previous_key = Some(entry.key.clone());
        Some(Ok(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::digest::namespace_digest;

    fn descriptor(entry_count: Option<u64>, digest: Option<HexBytes>) -> NamespaceDescriptor {
        NamespaceDescriptor {
            name: "cc1".to_string(),
            file: "public_state/cc1.jsonl".to_string(),
            entry_count,
            digest,
        }
    }

    fn checked(
        entries: Vec<Entry>,
        desc: &NamespaceDescriptor,
    ) -> CheckedEntries<impl Iterator<Item = Result<Entry>>> {
        CheckedEntries::new(entries.into_iter().map(Ok::<Entry, ExError>), "snap", desc)
    }

    #[test]
    fn test_sorted_stream_passes() {
        let entries = vec![Entry::new("a", "1"), Entry::new("b", "2")];
        let desc = descriptor(Some(2), Some(namespace_digest(&entries)));
        let out: Result<Vec<Entry>> = checked(entries.clone(), &desc).collect();
        assert_eq!(out.unwrap(), entries);
    }

    #[test]
    fn test_out_of_order_key_fails() {
        let entries = vec![Entry::new("b", "1"), Entry::new("a", "2")];
        let desc = descriptor(None, None);
        let mut it = checked(entries, &desc);
        assert!(it.next().unwrap().is_ok());
        let err = it.next().unwrap().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
        assert_eq!(err.location(), Some("entry 2"));
        assert_eq!(err.namespace(), Some("cc1"));
        assert!(it.next().is_none(), "stream must be fused after an error");
    }

    #[test]
    fn test_duplicate_key_fails() {
        let entries = vec![Entry::new("a", "1"), Entry::new("a", "2")];
        let desc = descriptor(None, None);
        let err = checked(entries, &desc)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::OrderingViolation);
        assert!(err.message().contains("duplicate"));
    }

    #[test]
    fn test_entry_count_mismatch_at_end() {
        let entries = vec![Entry::new("a", "1")];
        let desc = descriptor(Some(3), None);
        let err = checked(entries, &desc)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::EntryCountMismatch);
    }

    #[test]
    fn test_digest_mismatch_at_end() {
        let entries = vec![Entry::new("a", "1")];
        let wrong = namespace_digest(&[Entry::new("a", "2")]);
        let desc = descriptor(None, Some(wrong));
        let err = checked(entries, &desc)
            .collect::<Result<Vec<_>>>()
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DigestMismatch);
    }

    #[test]
    fn test_inner_error_passes_through() {
        let desc = descriptor(None, None);
        let inner = vec![
            Ok(Entry::new("a", "1")),
            Err(ExError::new(ExErrorKind::InvalidEntry)),
            Ok(Entry::new("b", "1")),
        ];
        let mut it = CheckedEntries::new(inner.into_iter(), "snap", &desc);
        assert!(it.next().unwrap().is_ok());
        assert_eq!(
            it.next().unwrap().unwrap_err().kind(),
            ExErrorKind::InvalidEntry
        );
        assert!(it.next().is_none());
    }
}
