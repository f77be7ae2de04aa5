//! Project header block codec.
//!
//! # Responsibility
//! - Split a project document into its `---` header block and body.
//! - Parse header lines (`field: value`) into an ordered field list.
//! - Stamp the `completed` date and render the header back to text.
//!
//! # Invariants
//! - Parsing is strict: a missing delimiter or an unsplittable line fails.
//! - Canonical fields keep the order `area, title, type, created, started,
//!   last_reviewed, due, completed`; unknown fields follow in source order.
//! - Values never contain line breaks or the `---` delimiter, on either the
//!   parse or the render path.
//! - Dates always render as `YYYY-MM-DD`.

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::project::ProjectType;

/// Line that opens and closes the header block.
pub const HEADER_DELIMITER: &str = "---";
/// Field written by project completion.
pub const COMPLETED_FIELD: &str = "completed";
/// Canonical header fields in render order.
pub const CANONICAL_FIELDS: [&str; 8] = [
    "area",
    "title",
    "type",
    "created",
    "started",
    "last_reviewed",
    "due",
    COMPLETED_FIELD,
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Header codec errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Delimiters are missing or a header line is not `field: value`.
    MalformedHeader(String),
    /// A field that may only appear once is already present.
    DuplicateField(String),
    /// A value would make the header ambiguous.
    InvalidValue { field: String, reason: &'static str },
}

impl Display for FrontmatterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedHeader(detail) => write!(f, "malformed header: {detail}"),
            Self::DuplicateField(field) => write!(f, "header field already present: {field}"),
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid value for header field `{field}`: {reason}")
            }
        }
    }
}

impl Error for FrontmatterError {}

/// Ordered header field list.
///
/// Backed by a `Vec` because field order is observable in the rendered file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: Vec<(String, String)>,
}

impl Frontmatter {
    /// Builds a header from pairs, validating names and values and placing
    /// canonical fields first.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FrontmatterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut fields: Vec<(String, String)> = Vec::new();
        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();
            if !is_valid_field_name(&name) {
                return Err(FrontmatterError::MalformedHeader(format!(
                    "invalid field name `{name}`"
                )));
            }
            validate_value(&name, &value)?;
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(FrontmatterError::DuplicateField(name));
            }
            fields.push((name, value));
        }
        fields.sort_by_key(|(name, _)| field_rank(name));
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    pub fn area(&self) -> Option<&str> {
        self.get("area")
    }

    pub fn project_type(&self) -> Option<ProjectType> {
        self.get("type").and_then(ProjectType::parse)
    }

    /// Field names in stored order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Splits a document into `(header_block, body)`.
///
/// The header block includes both delimiter lines and the closing line break;
/// the body is returned byte-for-byte.
pub fn split_document(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let mut offset = 0;
    let mut opened = false;
    for line in content.split_inclusive('\n') {
        let end = offset + line.len();
        let bare = line.trim_end_matches(['\n', '\r']);
        if !opened {
            if bare != HEADER_DELIMITER {
                return Err(FrontmatterError::MalformedHeader(
                    "document must start with `---`".to_string(),
                ));
            }
            opened = true;
        } else if bare == HEADER_DELIMITER {
            return Ok((&content[..end], &content[end..]));
        }
        offset = end;
    }

    let detail = if opened {
        "closing `---` not found"
    } else {
        "document is empty"
    };
    Err(FrontmatterError::MalformedHeader(detail.to_string()))
}

/// Parses a delimited header block into an ordered field list.
///
/// Blank lines inside the block are ignored. Every other line must be
/// `field: value`; the value may be empty.
pub fn parse_frontmatter(header: &str) -> Result<Frontmatter, FrontmatterError> {
    let mut lines = header.lines();
    match lines.next() {
        Some(first) if first.trim_end() == HEADER_DELIMITER => {}
        _ => {
            return Err(FrontmatterError::MalformedHeader(
                "opening `---` not found".to_string(),
            ))
        }
    }

    let mut pairs = Vec::new();
    let mut closed = false;
    for (index, line) in lines.by_ref().enumerate() {
        let line = line.trim_end();
        if line == HEADER_DELIMITER {
            closed = true;
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = line.split_once(':').ok_or_else(|| {
            FrontmatterError::MalformedHeader(format!(
                "line {} is not `field: value`: `{line}`",
                index + 2
            ))
        })?;
        pairs.push((name.trim().to_string(), value.trim().to_string()));
    }

    if !closed {
        return Err(FrontmatterError::MalformedHeader(
            "closing `---` not found".to_string(),
        ));
    }
    if lines.any(|rest| !rest.trim().is_empty()) {
        return Err(FrontmatterError::MalformedHeader(
            "unexpected text after closing `---`".to_string(),
        ));
    }

    Frontmatter::from_pairs(pairs)
}

/// Returns a copy of `frontmatter` with `completed` appended after all
/// present fields. Existing values are never touched.
pub fn with_completion_date(
    frontmatter: &Frontmatter,
    date: NaiveDate,
) -> Result<Frontmatter, FrontmatterError> {
    if frontmatter.contains(COMPLETED_FIELD) {
        return Err(FrontmatterError::DuplicateField(COMPLETED_FIELD.to_string()));
    }
    let mut stamped = frontmatter.clone();
    stamped
        .fields
        .push((COMPLETED_FIELD.to_string(), format_date(date)));
    Ok(stamped)
}

/// Renders a header block, delimiters included, ending with a line break.
pub fn serialize_frontmatter(frontmatter: &Frontmatter) -> Result<String, FrontmatterError> {
    let mut ordered: Vec<&(String, String)> = frontmatter.fields.iter().collect();
    ordered.sort_by_key(|(name, _)| field_rank(name));

    let mut out = String::new();
    out.push_str(HEADER_DELIMITER);
    out.push('\n');
    for (name, value) in ordered {
        validate_value(name, value)?;
        out.push_str(name);
        out.push(':');
        if !value.is_empty() {
            out.push(' ');
            out.push_str(value);
        }
        out.push('\n');
    }
    out.push_str(HEADER_DELIMITER);
    out.push('\n');
    Ok(out)
}

/// Reads one field from a document without enforcing strict header rules.
///
/// Used for scanning neighbours whose headers may be messy; returns `None`
/// when the header or field cannot be found.
pub fn peek_field(content: &str, name: &str) -> Option<String> {
    let mut lines = content.lines();
    if lines.next()?.trim() != HEADER_DELIMITER {
        return None;
    }
    for line in lines {
        let line = line.trim();
        if line == HEADER_DELIMITER {
            break;
        }
        if let Some((field, value)) = line.split_once(':') {
            if field.trim() == name {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

/// Renders a date the way every header date is written.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn field_rank(name: &str) -> usize {
    CANONICAL_FIELDS
        .iter()
        .position(|field| *field == name)
        .unwrap_or(CANONICAL_FIELDS.len())
}

fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn validate_value(name: &str, value: &str) -> Result<(), FrontmatterError> {
    if value.contains(['\n', '\r']) {
        return Err(FrontmatterError::InvalidValue {
            field: name.to_string(),
            reason: "line breaks are not allowed",
        });
    }
    if value.contains(HEADER_DELIMITER) {
        return Err(FrontmatterError::InvalidValue {
            field: name.to_string(),
            reason: "the `---` delimiter is not allowed",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        parse_frontmatter, peek_field, serialize_frontmatter, split_document,
        with_completion_date, Frontmatter, FrontmatterError,
    };
    use crate::model::project::ProjectType;
    use chrono::NaiveDate;

    const HEADER: &str = "---\n\
area: Health\n\
title: Upgrade Anbernic SD Cards\n\
type: standard\n\
created: 2025-10-20\n\
started: 2025-10-20\n\
last_reviewed: 2025-10-21\n\
---\n";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    }

    #[test]
    fn parses_fields_in_order() {
        let parsed = parse_frontmatter(HEADER).unwrap();
        assert_eq!(
            parsed.field_names(),
            vec!["area", "title", "type", "created", "started", "last_reviewed"]
        );
        assert_eq!(parsed.title(), Some("Upgrade Anbernic SD Cards"));
        assert_eq!(parsed.project_type(), Some(ProjectType::Standard));
    }

    #[test]
    fn parse_reorders_canonical_fields_and_keeps_unknown_after() {
        let header = "---\nzeta: 1\ntitle: T\nalpha: 2\narea: Home\n---\n";
        let parsed = parse_frontmatter(header).unwrap();
        assert_eq!(parsed.field_names(), vec!["area", "title", "zeta", "alpha"]);
    }

    #[test]
    fn parse_rejects_missing_delimiters() {
        assert!(matches!(
            parse_frontmatter("area: Health\n---\n"),
            Err(FrontmatterError::MalformedHeader(_))
        ));
        assert!(matches!(
            parse_frontmatter("---\narea: Health\n"),
            Err(FrontmatterError::MalformedHeader(_))
        ));
    }

    #[test]
    fn parse_rejects_unsplittable_line() {
        let err = parse_frontmatter("---\narea: Health\njust words\n---\n").unwrap_err();
        match err {
            FrontmatterError::MalformedHeader(detail) => assert!(detail.contains("just words")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_duplicate_and_delimiter_values() {
        assert_eq!(
            parse_frontmatter("---\ntitle: A\ntitle: B\n---\n").unwrap_err(),
            FrontmatterError::DuplicateField("title".to_string())
        );
        assert!(matches!(
            parse_frontmatter("---\ntitle: A --- B\n---\n"),
            Err(FrontmatterError::InvalidValue { .. })
        ));
    }

    #[test]
    fn completion_date_is_appended_last() {
        let parsed = parse_frontmatter(HEADER).unwrap();
        let stamped = with_completion_date(&parsed, today()).unwrap();
        assert_eq!(stamped.field_names().last(), Some(&"completed"));
        assert_eq!(stamped.get("completed"), Some("2025-11-03"));
        assert_eq!(stamped.get("started"), parsed.get("started"));
        assert!(!parsed.contains("completed"));
    }

    #[test]
    fn completion_date_rejects_recompletion() {
        let parsed = parse_frontmatter("---\ntitle: T\ncompleted: 2025-01-01\n---\n").unwrap();
        assert_eq!(
            with_completion_date(&parsed, today()).unwrap_err(),
            FrontmatterError::DuplicateField("completed".to_string())
        );
    }

    #[test]
    fn serialize_renders_canonical_order_then_unknown() {
        let fm = Frontmatter::from_pairs([
            ("owner", "me"),
            ("due", "2025-12-01"),
            ("title", "T"),
            ("area", "Career"),
        ])
        .unwrap();
        let stamped = with_completion_date(&fm, today()).unwrap();
        assert_eq!(
            serialize_frontmatter(&stamped).unwrap(),
            "---\narea: Career\ntitle: T\ndue: 2025-12-01\ncompleted: 2025-11-03\nowner: me\n---\n"
        );
    }

    #[test]
    fn empty_value_renders_distinct_from_absent() {
        let fm = Frontmatter::from_pairs([("title", "T"), ("started", "")]).unwrap();
        let rendered = serialize_frontmatter(&fm).unwrap();
        assert_eq!(rendered, "---\ntitle: T\nstarted:\n---\n");
        let reparsed = parse_frontmatter(&rendered).unwrap();
        assert_eq!(reparsed.get("started"), Some(""));
        assert_eq!(reparsed.get("due"), None);
    }

    #[test]
    fn serialize_then_parse_is_stable() {
        let once = parse_frontmatter(HEADER).unwrap();
        let again = parse_frontmatter(&serialize_frontmatter(&once).unwrap()).unwrap();
        assert_eq!(again, once);
    }

    #[test]
    fn split_document_keeps_body_verbatim() {
        let doc = format!("{HEADER}\n# Content\n\n- note ---\n");
        let (header, body) = split_document(&doc).unwrap();
        assert_eq!(header, HEADER);
        assert_eq!(body, "\n# Content\n\n- note ---\n");
    }

    #[test]
    fn split_document_requires_leading_delimiter() {
        assert!(split_document("# no header\n").is_err());
        assert!(split_document("").is_err());
        assert!(split_document("---\ntitle: T\n").is_err());
    }

    #[test]
    fn peek_field_tolerates_messy_headers() {
        let doc = "---\ntitle: Messy One\nnot a field\n---\nbody";
        assert_eq!(peek_field(doc, "title").as_deref(), Some("Messy One"));
        assert_eq!(peek_field("no header", "title"), None);
        assert_eq!(peek_field("---\narea: A\n---\ntitle: body", "title"), None);
    }
}
