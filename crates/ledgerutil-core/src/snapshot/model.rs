//! Snapshot data model.
//!
//! These types mirror the on-disk metadata document and the records of a
//! namespace data file. Byte strings that are hashes travel as lowercase hex
//! in JSON via [`HexBytes`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque byte string rendered as lowercase hex in JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexBytes(Vec<u8>);

impl HexBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Decode from a hex string
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The first `chars` hex characters, for file names and summaries
    pub fn short_hex(&self, chars: usize) -> String {
        let mut full = self.to_hex();
        full.truncate(chars);
        full
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexBytes::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Block/transaction position at which a key was last written.
///
/// Display only; never part of equality or digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub block_num: u64,
    pub tx_num: u64,
}

/// One key/value record of a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub version: Option<Version>,
}

impl Entry {
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, block_num: u64, tx_num: u64) -> Self {
        self.version = Some(Version { block_num, tx_num });
        self
    }
}

/// Metadata entry describing one namespace and where its data lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescriptor {
    pub name: String,
    /// Data file path, relative to the snapshot root
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<HexBytes>,
}

/// Parsed `_snapshot_metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub format_version: u32,
    pub channel_name: String,
    pub last_block_number: u64,
    pub last_block_hash: HexBytes,
    pub previous_block_hash: HexBytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_db_type: Option<String>,
    pub public_state_hash: HexBytes,
    pub namespaces: Vec<NamespaceDescriptor>,
}

impl SnapshotMetadata {
    /// Ledger height: number of blocks committed when the snapshot was taken
    pub fn height(&self) -> u64 {
        self.last_block_number.saturating_add(1)
    }

    /// Look up a namespace descriptor; namespaces are kept sorted by name.
    pub fn namespace(&self, name: &str) -> Option<&NamespaceDescriptor> {
        self.namespaces
            .binary_search_by(|d| d.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.namespaces[i])
    }
}

/// Render a key or value for humans: quoted UTF-8 when printable, else `0x` hex.
pub fn display_bytes(bytes: &[u8]) -> String {
    match printable_utf8(bytes) {
        Some(text) => format!("{:?}", text),
        None => format!("0x{}", hex::encode(bytes)),
    }
}

/// The bytes as `&str` when they are valid UTF-8 without control characters
pub fn printable_utf8(bytes: &[u8]) -> Option<&str> {
    std::str::from_utf8(bytes)
        .ok()
        .filter(|s| !s.chars().any(char::is_control))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes_serde_as_string() {
        let h = HexBytes::new(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, "\"deadbeef\"");
        let back: HexBytes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, h);
    }

    #[test]
    fn test_hex_bytes_rejects_invalid_hex() {
        let result: Result<HexBytes, _> = serde_json::from_str("\"xyz\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_short_hex_handles_short_values() {
        assert_eq!(HexBytes::new(vec![0xab]).short_hex(8), "ab");
        assert_eq!(HexBytes::new(vec![0xab; 8]).short_hex(4), "abab");
    }

    #[test]
    fn test_height_is_last_block_plus_one() {
        let meta = SnapshotMetadata {
            format_version: 1,
            channel_name: "ch".to_string(),
            last_block_number: 41,
            last_block_hash: HexBytes::default(),
            previous_block_hash: HexBytes::default(),
            state_db_type: None,
            public_state_hash: HexBytes::new(vec![1]),
            namespaces: vec![],
        };
        assert_eq!(meta.height(), 42);
    }

    #[test]
    fn test_display_bytes() {
        assert_eq!(display_bytes(b"k1"), "\"k1\"");
        assert_eq!(display_bytes(&[0x00, 0xff]), "0x00ff");
        assert_eq!(display_bytes(b"a\nb"), "0x610a62");
    }
}
