//! Domain model for the execution-system corpus.
//!
//! # Responsibility
//! - Define project lifecycle folders, project types and identifiers.
//! - Define the open-work line item shape shared by scanners.
//!
//! # Invariants
//! - Every value here is plain data; nothing caches filesystem state.

pub mod action;
pub mod project;
