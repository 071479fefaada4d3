//! File system operations with transaction support.
//!
//! Provides atomic manifest writes that can be committed or rolled back as
//! a unit, with a dry-run mode for previewing changes.

pub mod transaction;

pub use transaction::{Operation, Transaction};
