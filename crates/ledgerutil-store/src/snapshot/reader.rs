//! On-disk snapshot reader.
//!
//! A snapshot directory holds `_snapshot_metadata.json` and one JSON-lines
//! data file per namespace. Each data line is
//! `{"key": "<base64>", "value": "<base64>", "version": {...}}`.
//!
//! Data files are streamed line by line through a [`BufReader`]; a namespace
//! is never loaded in full.

#![allow(clippy::result_large_err)]

use crate::errors::{invalid_entry, io_error, io_error_at, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ledgerutil_core::errors::{ExError, ExErrorKind};
use ledgerutil_core::snapshot::{
    parse_metadata_bytes, CheckedEntries, Entry, EntryStream, SnapshotMetadata, SnapshotSource,
    Version, METADATA_FILE_NAME,
};
use ledgerutil_core::{log_op_end, log_op_error, log_op_start};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Wire form of one data line
#[derive(Debug, Serialize, Deserialize)]
struct EntryLine {
    key: String,
    value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<Version>,
}

/// Encode an entry as one data line (without the trailing newline)
pub fn encode_entry_line(entry: &Entry) -> Result<String> {
    let line = EntryLine {
        key: STANDARD.encode(&entry.key),
        value: STANDARD.encode(&entry.value),
        version: entry.version,
    };
    Ok(serde_json::to_string(&line)?)
}

/// Decode one data line. The error string is the reason only; the caller adds
/// snapshot, namespace and line context.
pub fn decode_entry_line(line: &str) -> std::result::Result<Entry, String> {
    let raw: EntryLine = serde_json::from_str(line)
        .map_err(|e| format!("line is not a valid entry record: {}", e))?;
    let key = STANDARD
        .decode(raw.key.as_bytes())
        .map_err(|e| format!("key is not valid base64: {}", e))?;
    let value = STANDARD
        .decode(raw.value.as_bytes())
        .map_err(|e| format!("value is not valid base64: {}", e))?;
    Ok(Entry {
        key,
        value,
        version: raw.version,
    })
}

/// A snapshot directory opened for reading
#[derive(Debug, Clone)]
pub struct FsSnapshot {
    root: PathBuf,
    label: String,
    metadata: SnapshotMetadata,
}

impl FsSnapshot {
    /// Open a snapshot directory and validate its metadata.
    ///
    /// Only the metadata is read; data files are opened lazily per namespace.
    ///
    /// # Errors
    ///
    /// - `Io` when the directory is missing, not a directory, or unreadable
    /// - `InvalidMetadata` when the metadata file is missing, plus every
    ///   error of [`parse_metadata_bytes`]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref();
        let label = root.display().to_string();
        log_op_start!("open_snapshot", snapshot = label.as_str());
        let start = Instant::now();

        let snapshot = open_impl(root, label.clone()).map_err(|e| {
            log_op_error!(
                "open_snapshot",
                &e,
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "open_snapshot",
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot = label.as_str(),
            channel = snapshot.metadata.channel_name.as_str(),
            height = snapshot.metadata.height()
        );
        Ok(snapshot)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn open_impl(root: &Path, label: String) -> Result<FsSnapshot> {
    let dir = fs::metadata(root).map_err(|e| io_error("open_snapshot", e).with_snapshot(&label))?;
    if !dir.is_dir() {
        return Err(ExError::new(ExErrorKind::Io)
            .with_op("open_snapshot")
            .with_snapshot(&label)
            .with_message("snapshot path is not a directory"));
    }

    let metadata_path = root.join(METADATA_FILE_NAME);
    let bytes = match fs::read(&metadata_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ExError::new(ExErrorKind::InvalidMetadata)
                .with_op("open_snapshot")
                .with_snapshot(&label)
                .with_message(format!("metadata file `{}` is missing", METADATA_FILE_NAME)));
        }
        Err(e) => {
            return Err(io_error_at("read_metadata", &metadata_path, e).with_snapshot(&label));
        }
    };

    let metadata = parse_metadata_bytes(&bytes, &label)?;
    Ok(FsSnapshot {
        root: root.to_path_buf(),
        label,
        metadata,
    })
}

impl SnapshotSource for FsSnapshot {
    fn label(&self) -> &str {
        &self.label
    }

    fn metadata(&self) -> &SnapshotMetadata {
        &self.metadata
    }

    fn entries(&self, namespace: &str) -> Result<EntryStream<'_>> {
        let descriptor = self.descriptor(namespace)?;
        let path = self.root.join(&descriptor.file);
        let file = File::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ExError::new(ExErrorKind::InvalidMetadata)
                    .with_op("read_entries")
                    .with_snapshot(&self.label)
                    .with_namespace(namespace)
                    .with_message(format!("data file `{}` is missing", descriptor.file))
            } else {
                io_error_at("read_entries", &path, e)
                    .with_snapshot(&self.label)
                    .with_namespace(namespace)
            }
        })?;

        let lines = LineEntries {
            reader: BufReader::new(file),
            buf: Vec::new(),
            line_no: 0,
            snapshot: self.label.clone(),
            namespace: namespace.to_string(),
        };
        Ok(Box::new(CheckedEntries::new(
            lines,
            self.label.clone(),
            descriptor,
        )))
    }
}

/// Decodes data lines into entries; blank lines are skipped.
///
/// Lines are read as raw bytes so a line that is not UTF-8 is reported as a
/// malformed entry rather than a read failure.
struct LineEntries {
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: u64,
    snapshot: String,
    namespace: String,
}

impl LineEntries {
    fn malformed(&self, reason: impl Into<String>) -> ExError {
        invalid_entry(&self.snapshot, &self.namespace, self.line_no, reason.into())
    }
}

impl Iterator for LineEntries {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(io_error("read_entries", e)
                        .with_snapshot(&self.snapshot)
                        .with_namespace(&self.namespace)
                        .with_location(format!("line {}", self.line_no + 1))))
                }
            }
            let line = match std::str::from_utf8(&self.buf) {
                Ok(line) => line,
                Err(e) => return Some(Err(self.malformed(format!("line is not valid UTF-8: {}", e)))),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(decode_entry_line(line).map_err(|reason| self.malformed(reason)));
        }
    }
}
