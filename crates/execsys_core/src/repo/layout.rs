//! On-disk layout of an execution-system corpus.
//!
//! # Responsibility
//! - Map lifecycle folders and open-work sources to concrete paths.
//!
//! # Invariants
//! - Paths are derived only from the root.
//! - Directory listings are sorted so traversal order is deterministic.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::project::LifecycleFolder;

const PROJECTS_DIR: &str = "docs/execution_system/10k-projects";
const NEXT_ACTIONS_DIR: &str = "docs/execution_system/00k-next-actions";
const CONTEXTS_DIR: &str = "contexts";
const PROJECT_FILE_EXTENSION: &str = "md";

/// Single-file open-work lists, in report order.
pub const LIST_SOURCES: [(&str, &str); 3] = [
    ("Waiting For", "@waiting.md"),
    ("Incubating", "@incubating.md"),
    ("Deferred", "@deferred.md"),
];

/// Archive of resolved items. Never scanned for blockers.
pub const COMPLETED_LIST: &str = "completed.md";

/// Path resolver rooted at the configured repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLayout {
    root: PathBuf,
}

impl CorpusLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `10k-projects/<folder>`.
    pub fn folder_dir(&self, folder: LifecycleFolder) -> PathBuf {
        self.root.join(PROJECTS_DIR).join(folder.dir_name())
    }

    /// `10k-projects/<folder>/<area>`.
    pub fn area_dir(&self, folder: LifecycleFolder, area: &str) -> PathBuf {
        self.folder_dir(folder).join(area)
    }

    /// `00k-next-actions`.
    pub fn next_actions_dir(&self) -> PathBuf {
        self.root.join(NEXT_ACTIONS_DIR)
    }

    /// `00k-next-actions/contexts`.
    pub fn contexts_dir(&self) -> PathBuf {
        self.next_actions_dir().join(CONTEXTS_DIR)
    }

    /// Path of a source named relative to `00k-next-actions`.
    pub fn next_actions_file(&self, relative: &str) -> PathBuf {
        self.next_actions_dir().join(relative)
    }
}

/// Returns whether `path` looks like a project or list document.
pub fn is_markdown_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == PROJECT_FILE_EXTENSION)
}

/// Lists a directory sorted by path; a missing directory lists as empty.
pub fn sorted_dir_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut paths = entries
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<io::Result<Vec<_>>>()?;
    paths.sort();
    Ok(paths)
}
