//! Snapshot model and read path.
//!
//! ## Responsibilities
//!
//! - Snapshot metadata schema and validation
//! - Digest construction (namespace digest, public state hash)
//! - The [`SnapshotSource`] read interface and its ordering checks
//!
//! ## Non-Responsibilities
//!
//! - Filesystem access (handled by `ledgerutil-store`)
//! - Orchestration (handled by `ledgerutil-engine`)

pub mod checked;
pub mod digest;
pub mod memory;
pub mod metadata;
pub mod model;
pub mod source;

/// Name of the metadata document at the root of a snapshot directory
pub const METADATA_FILE_NAME: &str = "_snapshot_metadata.json";

/// Directory holding namespace data files, relative to the snapshot root
pub const PUBLIC_STATE_DIR: &str = "public_state";

/// Snapshot format version understood by this build
pub const FORMAT_VERSION: u32 = 1;

pub use checked::CheckedEntries;
pub use digest::{compare_digests, DigestVerdict, NamespaceHasher};
pub use memory::MemorySnapshot;
pub use metadata::{ensure_comparable, parse_metadata_bytes};
pub use model::{Entry, HexBytes, NamespaceDescriptor, SnapshotMetadata, Version};
pub use source::{EntryStream, SnapshotSource};
