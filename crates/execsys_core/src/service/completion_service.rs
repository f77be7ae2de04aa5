//! Project completion use-case.
//!
//! # Responsibility
//! - Run locate -> blocker check -> header decode -> stamp -> relocate.
//! - Convert every failure into one rejection with a stable reason code.
//!
//! # Invariants
//! - Steps run strictly in order and stop at the first failure.
//! - Nothing under `active/` or `completed/` changes unless relocation runs.
//! - The active file is deleted only after the completed copy has been
//!   written and synced; an existing destination is never overwritten.
//! - If deleting the active file fails, the new copy is removed again.
//! - The body after the header is written back byte-for-byte.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::codec::frontmatter::{
    format_date, parse_frontmatter, serialize_frontmatter, split_document, with_completion_date,
    FrontmatterError,
};
use crate::model::project::{project_identifier, LifecycleFolder, ProjectType};
use crate::repo::layout::CorpusLayout;
use crate::repo::project_locator::{locate_active_project, LocateError, LocatedProject};
use crate::scan::blockers::{collect_blockers, BlockerReport, BlockerScanError};

/// Completion failure taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// The caller passed an empty title.
    MissingTitle,
    ProjectNotFound {
        title: String,
    },
    ProjectNotActive {
        title: String,
        folder: LifecycleFolder,
    },
    BlockedByOpenItems {
        title: String,
        report: BlockerReport,
    },
    MalformedHeader(String),
    DuplicateField(String),
    FileSystem {
        operation: &'static str,
        path: PathBuf,
        detail: String,
    },
}

impl CompletionError {
    /// Stable snake_case reason code for callers and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::ProjectNotFound { .. } => "project_not_found",
            Self::ProjectNotActive { .. } => "project_not_active",
            Self::BlockedByOpenItems { .. } => "blocked_by_open_items",
            Self::MalformedHeader(_) => "malformed_header",
            Self::DuplicateField(_) => "duplicate_field",
            Self::FileSystem { .. } => "file_system_error",
        }
    }

    fn file_system(operation: &'static str, path: &Path, err: &io::Error) -> Self {
        Self::FileSystem {
            operation,
            path: path.to_path_buf(),
            detail: err.to_string(),
        }
    }
}

impl Display for CompletionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing required parameter (title)"),
            Self::ProjectNotFound { title } => {
                write!(f, "Project '{title}' not found in active folder")
            }
            Self::ProjectNotActive {
                title,
                folder: LifecycleFolder::Completed,
            } => write!(f, "Project '{title}' is already completed"),
            Self::ProjectNotActive { title, folder } => {
                write!(f, "Project '{title}' is not active (found in {folder})")
            }
            Self::BlockedByOpenItems { title, report } => write!(
                f,
                "Cannot complete project '{title}' - {} open item(s) at 0k horizon:\n\n{report}\n\
                 Complete or remove these items before completing the project.",
                report.total()
            ),
            Self::MalformedHeader(detail) => write!(f, "malformed project header: {detail}"),
            Self::DuplicateField(field) => {
                write!(f, "project header already has a `{field}` field")
            }
            Self::FileSystem {
                operation,
                path,
                detail,
            } => write!(
                f,
                "file system error during {operation} of `{}`: {detail}",
                path.display()
            ),
        }
    }
}

impl Error for CompletionError {}

impl From<LocateError> for CompletionError {
    fn from(value: LocateError) -> Self {
        match value {
            LocateError::NotFound { title } => Self::ProjectNotFound { title },
            LocateError::NotActive { title, folder } => Self::ProjectNotActive { title, folder },
            LocateError::Io { path, source } => Self::file_system("list", &path, &source),
        }
    }
}

impl From<BlockerScanError> for CompletionError {
    fn from(value: BlockerScanError) -> Self {
        Self::file_system("read", &value.path, &value.source)
    }
}

impl From<FrontmatterError> for CompletionError {
    fn from(value: FrontmatterError) -> Self {
        match value {
            FrontmatterError::MalformedHeader(detail) => Self::MalformedHeader(detail),
            FrontmatterError::DuplicateField(field) => Self::DuplicateField(field),
            invalid @ FrontmatterError::InvalidValue { .. } => {
                Self::MalformedHeader(invalid.to_string())
            }
        }
    }
}

/// Successful completion summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub title: String,
    pub area: String,
    pub project_type: Option<ProjectType>,
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    pub completed: NaiveDate,
}

/// Terminal rejection handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub code: &'static str,
    pub detail: String,
    /// Full grouped listing when open items block completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockers: Option<BlockerReport>,
    #[serde(skip)]
    pub error: CompletionError,
}

impl From<CompletionError> for Rejection {
    fn from(error: CompletionError) -> Self {
        let blockers = match &error {
            CompletionError::BlockedByOpenItems { report, .. } => Some(report.clone()),
            _ => None,
        };
        Self {
            code: error.code(),
            detail: error.to_string(),
            blockers,
            error,
        }
    }
}

/// Result of one completion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionOutcome {
    Completed(CompletionReport),
    Rejected(Rejection),
}

impl CompletionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Reason code for rejections, `None` on success.
    pub fn reason_code(&self) -> Option<&'static str> {
        match self {
            Self::Completed(_) => None,
            Self::Rejected(rejection) => Some(rejection.code),
        }
    }
}

impl Display for CompletionOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed(report) => write!(
                f,
                "✓ Successfully completed project '{}'\n  Moved from: {}\n  Moved to: {}\n  Completed: {}",
                report.title,
                report.source_path.display(),
                report.destination_path.display(),
                format_date(report.completed)
            ),
            Self::Rejected(rejection) => match rejection.error {
                CompletionError::BlockedByOpenItems { .. } => write!(f, "✗ {}", rejection.detail),
                _ => write!(f, "✗ Error: {}", rejection.detail),
            },
        }
    }
}

/// Completion workflow over one corpus.
///
/// Stateless: every call re-reads the disk.
pub struct CompletionService {
    layout: CorpusLayout,
}

impl CompletionService {
    pub fn new(layout: CorpusLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    /// Completes `title` using today's local date.
    pub fn complete(&self, title: &str) -> CompletionOutcome {
        self.complete_on(title, Local::now().date_naive())
    }

    /// Completes `title`, stamping `today` as the completion date.
    pub fn complete_on(&self, title: &str, today: NaiveDate) -> CompletionOutcome {
        match self.try_complete(title, today) {
            Ok(report) => {
                info!(
                    "event=project_complete module=service status=ok title={:?} area={} completed={}",
                    report.title,
                    report.area,
                    format_date(report.completed)
                );
                CompletionOutcome::Completed(report)
            }
            Err(error) => {
                warn!(
                    "event=project_complete module=service status=rejected title={:?} code={}",
                    title,
                    error.code()
                );
                CompletionOutcome::Rejected(error.into())
            }
        }
    }

    /// Locates the active project and lists what blocks it, without writing.
    pub fn preview_blockers(&self, title: &str) -> Result<BlockerReport, CompletionError> {
        let project = self.locate(title)?;
        Ok(collect_blockers(&self.layout, &project_identifier(&project.title))?)
    }

    fn locate(&self, title: &str) -> Result<LocatedProject, CompletionError> {
        if title.trim().is_empty() {
            return Err(CompletionError::MissingTitle);
        }
        Ok(locate_active_project(&self.layout, title)?)
    }

    fn try_complete(
        &self,
        title: &str,
        today: NaiveDate,
    ) -> Result<CompletionReport, CompletionError> {
        let project = self.locate(title)?;

        let report = collect_blockers(&self.layout, &project_identifier(&project.title))?;
        if report.is_blocking() {
            return Err(CompletionError::BlockedByOpenItems {
                title: project.title,
                report,
            });
        }

        let content = fs::read_to_string(&project.path)
            .map_err(|err| CompletionError::file_system("read", &project.path, &err))?;
        let (header, body) = split_document(&content)?;
        let frontmatter = parse_frontmatter(header)?;

        let stamped = with_completion_date(&frontmatter, today)?;
        let document = format!("{}{body}", serialize_frontmatter(&stamped)?);

        let destination_dir = self
            .layout
            .area_dir(LifecycleFolder::Completed, &project.area);
        let destination_path = relocate(&project.path, &destination_dir, &document)?;

        Ok(CompletionReport {
            title: project.title,
            area: project.area,
            project_type: stamped.project_type(),
            source_path: project.path,
            destination_path,
            completed: today,
        })
    }
}

/// Writes `document` next to its new home, then deletes `source`.
///
/// The delete is reachable only after `write_new_file` returned `Ok`.
fn relocate(
    source: &Path,
    destination_dir: &Path,
    document: &str,
) -> Result<PathBuf, CompletionError> {
    let file_name = source.file_name().ok_or_else(|| CompletionError::FileSystem {
        operation: "relocate",
        path: source.to_path_buf(),
        detail: "source has no file name".to_string(),
    })?;
    fs::create_dir_all(destination_dir)
        .map_err(|err| CompletionError::file_system("create_dir", destination_dir, &err))?;
    let destination = destination_dir.join(file_name);

    write_new_file(&destination, document)?;

    if let Err(err) = fs::remove_file(source) {
        if let Err(cleanup) = fs::remove_file(&destination) {
            warn!(
                "event=relocate_rollback module=service status=error path={} error={}",
                destination.display(),
                cleanup
            );
        }
        return Err(CompletionError::file_system("remove_source", source, &err));
    }
    Ok(destination)
}

fn write_new_file(path: &Path, content: &str) -> Result<(), CompletionError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| CompletionError::file_system("write", path, &err))?;

    let written = file
        .write_all(content.as_bytes())
        .and_then(|()| file.sync_all());
    if let Err(err) = written {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(
                "event=partial_write_cleanup module=service status=error path={} error={}",
                path.display(),
                cleanup
            );
        }
        return Err(CompletionError::file_system("write", path, &err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{relocate, CompletionError, CompletionOutcome, Rejection};
    use crate::scan::blockers::BlockerReport;
    use std::fs;

    #[test]
    fn relocate_refuses_to_overwrite_and_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("active").join("p.md");
        let dest_dir = dir.path().join("completed");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(&source, "original").unwrap();
        fs::write(dest_dir.join("p.md"), "already here").unwrap();

        let err = relocate(&source, &dest_dir, "new").unwrap_err();
        assert!(matches!(err, CompletionError::FileSystem { operation: "write", .. }));
        assert_eq!(fs::read_to_string(&source).unwrap(), "original");
        assert_eq!(fs::read_to_string(dest_dir.join("p.md")).unwrap(), "already here");
    }

    #[test]
    fn relocate_rolls_back_when_source_cannot_be_removed() {
        let dir = tempfile::tempdir().unwrap();
        let missing_source = dir.path().join("active").join("gone.md");
        let dest_dir = dir.path().join("completed");

        let err = relocate(&missing_source, &dest_dir, "doc").unwrap_err();
        assert!(matches!(
            err,
            CompletionError::FileSystem { operation: "remove_source", .. }
        ));
        assert!(!dest_dir.join("gone.md").exists());
    }

    #[test]
    fn reason_codes_are_stable() {
        let cases = [
            (CompletionError::MissingTitle, "missing_title"),
            (
                CompletionError::ProjectNotFound { title: "X".into() },
                "project_not_found",
            ),
            (
                CompletionError::MalformedHeader("x".into()),
                "malformed_header",
            ),
            (
                CompletionError::DuplicateField("completed".into()),
                "duplicate_field",
            ),
        ];
        for (error, code) in cases {
            assert_eq!(error.code(), code);
        }
    }

    #[test]
    fn blocked_rejection_carries_report_and_serializes_it() {
        let rejection = Rejection::from(CompletionError::BlockedByOpenItems {
            title: "P".into(),
            report: BlockerReport {
                project_id: "p".into(),
                sources: Vec::new(),
            },
        });
        assert!(rejection.blockers.is_some());

        let json = serde_json::to_value(CompletionOutcome::Rejected(rejection)).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["code"], "blocked_by_open_items");
        assert_eq!(json["blockers"]["project_id"], "p");
    }
}
