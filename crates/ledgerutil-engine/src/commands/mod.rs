//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate between
//! core domain logic and the filesystem layer.

pub mod compare;
