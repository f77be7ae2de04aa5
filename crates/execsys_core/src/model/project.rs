//! Project domain model.
//!
//! # Responsibility
//! - Name the four lifecycle folders a project document can live in.
//! - Derive the project identifier used by `+tag` matching.
//!
//! # Invariants
//! - `project_identifier` is pure: the same title always yields the same id.
//! - Two titles that normalize to the same id are the same project for
//!   blocker purposes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static NON_IDENT_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid identifier separator regex"));

/// Lifecycle folder under the projects tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleFolder {
    /// Work currently being pursued.
    Active,
    /// Parked ideas that may become active later.
    Incubator,
    /// Finished projects; only completion writes here.
    Completed,
    /// Dropped projects.
    Descoped,
}

impl LifecycleFolder {
    /// All folders in the order they are laid out on disk.
    pub const ALL: [LifecycleFolder; 4] = [
        Self::Active,
        Self::Incubator,
        Self::Completed,
        Self::Descoped,
    ];

    /// Directory name used on disk.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Incubator => "incubator",
            Self::Completed => "completed",
            Self::Descoped => "descoped",
        }
    }
}

impl Display for LifecycleFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Project kind stored in the `type` header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Standard,
    Coordination,
    Habit,
}

impl ProjectType {
    /// Parses the header representation; unknown values return `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "standard" => Some(Self::Standard),
            "coordination" => Some(Self::Coordination),
            "habit" => Some(Self::Habit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Coordination => "coordination",
            Self::Habit => "habit",
        }
    }
}

/// Derives the hyphen-joined lowercase identifier for a project title.
///
/// Rules:
/// - lowercase the title;
/// - collapse every run of characters outside `[a-z0-9]` into one `-`;
/// - trim leading and trailing `-`.
///
/// Non-ASCII letters are treated as separators.
pub fn project_identifier(title: &str) -> String {
    let lowered = title.to_lowercase();
    let joined = NON_IDENT_RUN_RE.replace_all(&lowered, "-");
    joined.trim_matches('-').to_string()
}
