//! Filesystem access for the project corpus.
//!
//! # Responsibility
//! - Resolve corpus paths and locate project documents on disk.
//!
//! # Invariants
//! - Nothing is cached between calls; every lookup re-reads the tree.

pub mod layout;
pub mod project_locator;
