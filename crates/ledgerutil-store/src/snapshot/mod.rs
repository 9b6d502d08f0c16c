//! Filesystem snapshots
//!
//! - `reader`: `FsSnapshot`, streaming namespace data files
//! - `export`: `SnapshotExporter`, writing snapshot directories

pub mod export;
pub mod reader;

pub use export::SnapshotExporter;
pub use reader::{decode_entry_line, encode_entry_line, FsSnapshot};
