//! Project lookup by title across lifecycle folders.
//!
//! # Responsibility
//! - Resolve an exact title to a document under `active/<area>/`.
//! - Report where a non-active project actually lives.
//!
//! # Invariants
//! - Matching is exact and case-sensitive on the `title` header value,
//!   never on the file name.
//! - Traversal is sorted by name, so the first match is deterministic when
//!   one title exists in several areas.
//! - Unreadable or header-less neighbours are skipped, not fatal.

use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::codec::frontmatter::peek_field;
use crate::model::project::LifecycleFolder;
use crate::repo::layout::{is_markdown_file, sorted_dir_entries, CorpusLayout};

/// Folders searched after `active`, in report priority order.
const INACTIVE_FOLDERS: [LifecycleFolder; 3] = [
    LifecycleFolder::Incubator,
    LifecycleFolder::Completed,
    LifecycleFolder::Descoped,
];

/// Active project resolved from a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedProject {
    pub path: PathBuf,
    /// Area directory name, e.g. `health`.
    pub area: String,
    pub title: String,
}

/// Lookup failure.
#[derive(Debug)]
pub enum LocateError {
    NotFound { title: String },
    NotActive { title: String, folder: LifecycleFolder },
    Io { path: PathBuf, source: io::Error },
}

impl Display for LocateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { title } => write!(f, "project '{title}' not found"),
            Self::NotActive { title, folder } => {
                write!(f, "project '{title}' is not active (found in {folder})")
            }
            Self::Io { path, source } => {
                write!(f, "failed to list `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for LocateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Finds the active project whose header title equals `title`.
pub fn locate_active_project(
    layout: &CorpusLayout,
    title: &str,
) -> Result<LocatedProject, LocateError> {
    if let Some((path, area)) = find_in_folder(layout, LifecycleFolder::Active, title)? {
        return Ok(LocatedProject {
            path,
            area,
            title: title.to_string(),
        });
    }

    for folder in INACTIVE_FOLDERS {
        if find_in_folder(layout, folder, title)?.is_some() {
            return Err(LocateError::NotActive {
                title: title.to_string(),
                folder,
            });
        }
    }

    Err(LocateError::NotFound {
        title: title.to_string(),
    })
}

fn find_in_folder(
    layout: &CorpusLayout,
    folder: LifecycleFolder,
    title: &str,
) -> Result<Option<(PathBuf, String)>, LocateError> {
    let folder_dir = layout.folder_dir(folder);
    for area_dir in sorted_entries(&folder_dir)? {
        if !area_dir.is_dir() {
            continue;
        }
        for candidate in sorted_entries(&area_dir)? {
            if !is_markdown_file(&candidate) {
                continue;
            }
            let content = match fs::read_to_string(&candidate) {
                Ok(content) => content,
                Err(err) => {
                    debug!(
                        "event=project_scan_skip module=locator path={} error={}",
                        candidate.display(),
                        err
                    );
                    continue;
                }
            };
            if peek_field(&content, "title").as_deref() == Some(title) {
                let area = dir_name(&area_dir);
                return Ok(Some((candidate, area)));
            }
        }
    }
    Ok(None)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LocateError> {
    sorted_dir_entries(dir).map_err(|source| LocateError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
