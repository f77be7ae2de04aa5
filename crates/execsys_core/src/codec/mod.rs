//! Text codecs for project documents.
//!
//! # Responsibility
//! - Own the header block format; callers never hand-roll `field: value` lines.

pub mod frontmatter;
