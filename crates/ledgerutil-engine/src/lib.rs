//! Ledgerutil Engine - Orchestration layer
//!
//! Provides the comparison driver that coordinates snapshot reading, the
//! merge-diff kernel and report writing.

pub mod commands;

pub use commands::compare::{
    compare, compare_snapshots, compare_snapshots_with_context, CompareOutcome,
};
