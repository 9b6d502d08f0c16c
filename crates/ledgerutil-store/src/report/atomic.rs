//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temp file next to the target, hidden and unique per process
fn temp_path_for(target_path: &Path) -> PathBuf {
    let name = target_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target_path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Atomically write bytes to a file
///
/// The content is written and synced to a temp file in the target directory,
/// then renamed over the target. On failure the temp file is removed and the
/// target is left untouched.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error("create_output_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);
    let result = write_synced(&temp_path, content).and_then(|()| {
        fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_temp", e))
    });

    if result.is_err() {
        // best effort cleanup
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| io_error("write_temp", e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_temp", e))?;
    file.sync_all().map_err(|e| io_error("sync_temp", e))?;
    Ok(())
}
