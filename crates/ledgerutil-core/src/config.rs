//! Comparison run configuration.
//!
//! Options are validated here, before any snapshot is opened.

use crate::errors::ConfigError;
use std::path::{Path, PathBuf};

/// Number of differences recorded in a report when the caller does not say otherwise
pub const DEFAULT_SAMPLE_LIMIT: usize = 10;

/// Options for one comparison run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Directory the report is written to; created if absent
    pub output_dir: PathBuf,
    /// Maximum number of difference records kept in the report
    pub sample_limit: usize,
}

impl CompareOptions {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }

    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// Build options from a signed "first diffs" count.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NegativeSampleLimit`] when `first_diffs` is negative.
    pub fn from_first_diffs(
        output_dir: impl Into<PathBuf>,
        first_diffs: i64,
    ) -> Result<Self, ConfigError> {
        let sample_limit = usize::try_from(first_diffs)
            .map_err(|_| ConfigError::NegativeSampleLimit { value: first_diffs })?;
        Ok(Self::new(output_dir).with_sample_limit(sample_limit))
    }
}

/// Reject empty snapshot path arguments.
///
/// # Errors
///
/// [`ConfigError::EmptySnapshotPath`] naming the first empty argument (1 or 2).
pub fn validate_snapshot_paths(first: &Path, second: &Path) -> Result<(), ConfigError> {
    if first.as_os_str().is_empty() {
        return Err(ConfigError::EmptySnapshotPath { position: 1 });
    }
    if second.as_os_str().is_empty() {
        return Err(ConfigError::EmptySnapshotPath { position: 2 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CompareOptions::new("/tmp/out");
        assert_eq!(opts.sample_limit, DEFAULT_SAMPLE_LIMIT);
        assert_eq!(opts.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_from_first_diffs() {
        assert_eq!(
            CompareOptions::from_first_diffs("out", 0).unwrap().sample_limit,
            0
        );
        assert_eq!(
            CompareOptions::from_first_diffs("out", 25).unwrap().sample_limit,
            25
        );
        assert_eq!(
            CompareOptions::from_first_diffs("out", -1).unwrap_err(),
            ConfigError::NegativeSampleLimit { value: -1 }
        );
    }

    #[test]
    fn test_validate_snapshot_paths() {
        assert!(validate_snapshot_paths(Path::new("a"), Path::new("b")).is_ok());
        assert_eq!(
            validate_snapshot_paths(Path::new(""), Path::new("b")).unwrap_err(),
            ConfigError::EmptySnapshotPath { position: 1 }
        );
        assert_eq!(
            validate_snapshot_paths(Path::new("a"), Path::new("")).unwrap_err(),
            ConfigError::EmptySnapshotPath { position: 2 }
        );
    }
}
