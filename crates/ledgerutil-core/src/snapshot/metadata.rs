//! Snapshot metadata parsing and validation.
//!
//! The entry point is [`parse_metadata_bytes`], which turns the raw bytes of
//! `_snapshot_metadata.json` into a validated [`SnapshotMetadata`].

use crate::errors::{ExError, ExErrorKind, Result};
use crate::snapshot::model::{HexBytes, NamespaceDescriptor, SnapshotMetadata};
use crate::snapshot::FORMAT_VERSION;
use serde_json::Value;
use std::path::{Component, Path};

/// Top-level fields that must be present in every metadata document.
const REQUIRED_FIELDS: &[&str] = &[
    "format_version",
    "channel_name",
    "last_block_number",
    "last_block_hash",
    "previous_block_hash",
    "public_state_hash",
    "namespaces",
];

/// Top-level fields holding hex-encoded byte strings.
const HEX_FIELDS: &[&str] = &["last_block_hash", "previous_block_hash", "public_state_hash"];

fn metadata_error(kind: ExErrorKind, label: &str, message: impl Into<String>) -> ExError {
    ExError::new(kind)
        .with_op("parse_metadata")
        .with_snapshot(label)
        .with_message(message)
}

/// Parse raw metadata bytes into a validated [`SnapshotMetadata`].
///
/// `label` identifies the snapshot in error messages.
///
/// # Errors
///
/// - `InvalidMetadata`: not UTF-8, not JSON, root not an object, bad field
///   types, or namespace descriptors that are empty, unsorted, duplicated or
///   point outside the snapshot
/// - `MissingField`: a required field is absent
/// - `UnsupportedFormat`: `format_version` is not supported
/// - `InvalidDigest`: a hash field is not valid hex, or the public state hash is empty
pub fn parse_metadata_bytes(bytes: &[u8], label: &str) -> Result<SnapshotMetadata> {
    let text = std::str::from_utf8(bytes).map_err(|e| {
        metadata_error(
            ExErrorKind::InvalidMetadata,
            label,
            format!("metadata is not valid UTF-8: {}", e),
        )
    })?;

    let raw: Value = serde_json::from_str(text).map_err(|e| {
        metadata_error(
            ExErrorKind::InvalidMetadata,
            label,
            format!("metadata is not valid JSON: {}", e),
        )
    })?;

    let obj = raw.as_object().ok_or_else(|| {
        metadata_error(
            ExErrorKind::InvalidMetadata,
            label,
            "metadata JSON root must be an object",
        )
    })?;

    for field in REQUIRED_FIELDS {
        if !obj.contains_key(*field) {
            return Err(metadata_error(
                ExErrorKind::MissingField,
                label,
                format!("required field `{}` is absent", field),
            ));
        }
    }

    match obj.get("format_version").and_then(Value::as_u64) {
        Some(v) if v == u64::from(FORMAT_VERSION) => {}
        Some(v) => {
            return Err(metadata_error(
                ExErrorKind::UnsupportedFormat,
                label,
                format!(
                    "format_version {} is not supported (expected {})",
                    v, FORMAT_VERSION
                ),
            ))
        }
        None => {
            return Err(metadata_error(
                ExErrorKind::InvalidMetadata,
                label,
                "`format_version` must be an unsigned integer",
            ))
        }
    }

    for field in HEX_FIELDS {
        check_hex(obj.get(*field), field, label)?;
    }
    if let Some(namespaces) = obj.get("namespaces").and_then(Value::as_array) {
        for ns in namespaces {
            check_hex(ns.get("digest"), "namespaces[].digest", label)?;
        }
    }

    let metadata: SnapshotMetadata = serde_json::from_value(raw.clone()).map_err(|e| {
        metadata_error(
            ExErrorKind::InvalidMetadata,
            label,
            format!("failed to deserialize metadata: {}", e),
        )
    })?;

    if metadata.public_state_hash.is_empty() {
        return Err(metadata_error(
            ExErrorKind::InvalidDigest,
            label,
            "`public_state_hash` is empty",
        ));
    }

    validate_namespaces(&metadata.namespaces, label)?;

    Ok(metadata)
}

/// Null and absent values pass; anything else must be a hex string.
fn check_hex(value: Option<&Value>, field: &str, label: &str) -> Result<()> {
    match value {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(s)) => HexBytes::from_hex(s).map(|_| ()).map_err(|e| {
            metadata_error(
                ExErrorKind::InvalidDigest,
                label,
                format!("`{}` is not valid hex: {}", field, e),
            )
        }),
        Some(other) => Err(metadata_error(
            ExErrorKind::InvalidDigest,
            label,
            format!("`{}` must be a hex string, got: {}", field, other),
        )),
    }
}

/// Namespaces must be non-empty, strictly ascending by name bytes, and
/// reference data files inside the snapshot directory.
fn validate_namespaces(namespaces: &[NamespaceDescriptor], label: &str) -> Result<()> {
    let mut previous: Option<&str> = None;
    for (index, ns) in namespaces.iter().enumerate() {
        if ns.name.is_empty() {
            return Err(metadata_error(
                ExErrorKind::InvalidMetadata,
                label,
                format!("namespace #{} has an empty name", index),
            ));
        }
        if let Some(prev) = previous {
            if ns.name.as_bytes() <= prev.as_bytes() {
                let what = if ns.name == prev {
                    "is listed more than once"
                } else {
                    "is not sorted after the previous namespace"
                };
                return Err(metadata_error(
                    ExErrorKind::InvalidMetadata,
                    label,
                    format!("namespace {}", what),
                )
                .with_namespace(ns.name.clone())
                .with_location(format!("namespaces[{}]", index)));
            }
        }
        if !is_contained_relative_path(&ns.file) {
            return Err(metadata_error(
                ExErrorKind::InvalidMetadata,
                label,
                format!("data file `{}` must be a relative path inside the snapshot", ns.file),
            )
            .with_namespace(ns.name.clone()));
        }
        previous = Some(&ns.name);
    }
    Ok(())
}

fn is_contained_relative_path(file: &str) -> bool {
    let path = Path::new(file);
    !file.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Fail unless both snapshots come from the same channel at the same height.
///
/// # Errors
///
/// `IncomparableSnapshots` when channel names or last block numbers differ.
pub fn ensure_comparable(
    first_label: &str,
    first: &SnapshotMetadata,
    second_label: &str,
    second: &SnapshotMetadata,
) -> Result<()> {
    let incomparable = |message: String| {
        ExError::new(ExErrorKind::IncomparableSnapshots)
            .with_op("ensure_comparable")
            .with_message(format!(
                "the supplied snapshots appear to be non-comparable: {}",
                message
            ))
    };

    if first.channel_name != second.channel_name {
        return Err(incomparable(format!(
            "channel names do not match ('{}' in {} vs '{}' in {})",
            first.channel_name, first_label, second.channel_name, second_label
        )));
    }
    if first.last_block_number != second.last_block_number {
        return Err(incomparable(format!(
            "last block numbers do not match ({} in {} vs {} in {})",
            first.last_block_number, first_label, second.last_block_number, second_label
        )));
    }
    Ok(())
}
