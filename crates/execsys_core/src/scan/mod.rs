//! Open-work scanning.
//!
//! # Responsibility
//! - Find open line items that still reference a project.
//!
//! # Invariants
//! - Line parsing is lenient here, unlike the strict header codec.

pub mod blockers;
pub mod tag_scanner;
