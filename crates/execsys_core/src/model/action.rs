//! Open-work line item model.
//!
//! # Responsibility
//! - Parse one `- [ ] 2025-10-30 Text @context +project` line into parts.
//!
//! # Invariants
//! - Parsing is lenient: malformed lines yield `None`, never an error.
//! - Tags are whole whitespace-separated tokens; `+a` never matches `+ab`.

use chrono::NaiveDate;

/// Marker for an unresolved item.
pub const OPEN_MARKER: &str = "- [ ]";
/// Markers for a resolved item.
pub const RESOLVED_MARKERS: &[&str] = &["- [x]", "- [X]"];
/// Leading sigil of a context tag.
pub const CONTEXT_SIGIL: char = '@';
/// Leading sigil of a project tag.
pub const PROJECT_SIGIL: char = '+';

const DATE_FORMAT: &str = "%Y-%m-%d";
const DUE_PREFIX: &str = "due:";
const DEFER_PREFIX: &str = "defer:";

/// Completion state of a line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemMarker {
    Open,
    Resolved,
}

/// One parsed line of an open-work source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLine {
    pub marker: ItemMarker,
    /// Item date written right after the marker.
    pub date: NaiveDate,
    /// Free text with tags and `due:`/`defer:` tokens removed.
    pub description: String,
    /// Context tags without the sigil, in line order.
    pub contexts: Vec<String>,
    /// Project tags without the sigil, in line order.
    pub projects: Vec<String>,
    pub due: Option<NaiveDate>,
    pub defer: Option<NaiveDate>,
}

impl ActionLine {
    /// Parses one line, returning `None` for anything that is not a dated item.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        let (marker, rest) = split_marker(trimmed)?;
        // The marker must be followed by whitespace, not glued to the date.
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }

        let mut tokens = rest.split_whitespace();
        let date = NaiveDate::parse_from_str(tokens.next()?, DATE_FORMAT).ok()?;

        let mut words = Vec::new();
        let mut contexts = Vec::new();
        let mut projects = Vec::new();
        let mut due = None;
        let mut defer = None;
        for token in tokens {
            if let Some(tag) = strip_tag(token, CONTEXT_SIGIL) {
                contexts.push(tag.to_string());
            } else if let Some(tag) = strip_tag(token, PROJECT_SIGIL) {
                projects.push(tag.to_string());
            } else if let Some(value) = parse_dated_token(token, DUE_PREFIX) {
                due = Some(value);
            } else if let Some(value) = parse_dated_token(token, DEFER_PREFIX) {
                defer = Some(value);
            } else {
                words.push(token);
            }
        }

        Some(Self {
            marker,
            date,
            description: words.join(" "),
            contexts,
            projects,
            due,
            defer,
        })
    }

    pub fn is_open(&self) -> bool {
        self.marker == ItemMarker::Open
    }

    /// Returns whether this item carries exactly `+{project_id}`.
    pub fn has_project_tag(&self, project_id: &str) -> bool {
        self.projects.iter().any(|tag| tag == project_id)
    }
}

fn split_marker(line: &str) -> Option<(ItemMarker, &str)> {
    if let Some(rest) = line.strip_prefix(OPEN_MARKER) {
        return Some((ItemMarker::Open, rest));
    }
    RESOLVED_MARKERS
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(|rest| (ItemMarker::Resolved, rest))
}

fn strip_tag(token: &str, sigil: char) -> Option<&str> {
    token.strip_prefix(sigil).filter(|tag| !tag.is_empty())
}

fn parse_dated_token(token: &str, prefix: &str) -> Option<NaiveDate> {
    let value = token.strip_prefix(prefix)?;
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
