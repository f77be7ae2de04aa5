//! Blocker aggregation across every open-work source.
//!
//! # Responsibility
//! - Run the tag scanner over the fixed source set and keep attribution.
//! - Render the grouped report shown when completion is refused.
//!
//! # Invariants
//! - Source order is `Waiting For`, `Incubating`, `Deferred`, then one entry
//!   per `contexts/*.md` file sorted by file name.
//! - The completed-items archive is never scanned.
//! - A missing source contributes zero items; other read failures surface.
//! - Items keep their original line order inside a source.

use log::debug;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::repo::layout::{is_markdown_file, sorted_dir_entries, CorpusLayout, LIST_SOURCES};
use crate::scan::tag_scanner::{scan_blocking_items, BlockingItem};

/// Blocking items found in one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBlockers {
    /// Display label, e.g. `Waiting For` or `@macbook`.
    pub label: String,
    /// Path relative to the next-actions directory.
    pub file: String,
    pub items: Vec<BlockingItem>,
}

/// Blocking items for one project grouped by source, in fixed source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockerReport {
    pub project_id: String,
    pub sources: Vec<SourceBlockers>,
}

impl BlockerReport {
    /// Total blocking items across all sources.
    pub fn total(&self) -> usize {
        self.sources.iter().map(|source| source.items.len()).sum()
    }

    pub fn is_blocking(&self) -> bool {
        self.total() > 0
    }

    /// Items for one source label; `None` when the source was not scanned.
    pub fn items_for(&self, label: &str) -> Option<&[BlockingItem]> {
        self.sources
            .iter()
            .find(|source| source.label == label)
            .map(|source| source.items.as_slice())
    }
}

impl Display for BlockerReport {
    /// Lists every source that has items, in report order.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for source in self.sources.iter().filter(|source| !source.items.is_empty()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "{} ({}):", source.label, source.file)?;
            for item in &source.items {
                writeln!(f, "  • {} {}", item.date.format("%Y-%m-%d"), item.description)?;
            }
        }
        Ok(())
    }
}

/// Failure reading an existing source.
#[derive(Debug)]
pub struct BlockerScanError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl Display for BlockerScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to read `{}`: {}", self.path.display(), self.source)
    }
}

impl Error for BlockerScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Scans every open-work source for open items tagged `+{project_id}`.
pub fn collect_blockers(
    layout: &CorpusLayout,
    project_id: &str,
) -> Result<BlockerReport, BlockerScanError> {
    let mut sources = Vec::new();

    for (label, file) in LIST_SOURCES {
        let path = layout.next_actions_file(file);
        sources.push(scan_source(label.to_string(), file.to_string(), &path, project_id)?);
    }

    let contexts_dir = layout.contexts_dir();
    let context_files = sorted_dir_entries(&contexts_dir).map_err(|source| BlockerScanError {
        path: contexts_dir.clone(),
        source,
    })?;
    for path in context_files.iter().filter(|path| is_markdown_file(path)) {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        sources.push(scan_source(
            format!("@{stem}"),
            format!("contexts/{file_name}"),
            path,
            project_id,
        )?);
    }

    let report = BlockerReport {
        project_id: project_id.to_string(),
        sources,
    };
    debug!(
        "event=blocker_scan module=scan project_id={} sources={} blocking_items={}",
        project_id,
        report.sources.len(),
        report.total()
    );
    Ok(report)
}

fn scan_source(
    label: String,
    file: String,
    path: &Path,
    project_id: &str,
) -> Result<SourceBlockers, BlockerScanError> {
    let items = match read_source(path)? {
        Some(content) => scan_blocking_items(&content, project_id).collect(),
        None => Vec::new(),
    };
    Ok(SourceBlockers { label, file, items })
}

/// Reads a source leniently: missing files are `None`, invalid UTF-8 is
/// replaced rather than rejected.
fn read_source(path: &Path) -> Result<Option<String>, BlockerScanError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(BlockerScanError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::collect_blockers;
    use crate::repo::layout::{CorpusLayout, COMPLETED_LIST};
    use std::fs;

    fn seed(layout: &CorpusLayout, relative: &str, content: &str) {
        let path = layout.next_actions_file(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn sources_follow_fixed_order_with_sorted_contexts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        seed(&layout, "contexts/phone.md", "- [ ] 2025-10-01 Call +p\n");
        seed(&layout, "contexts/macbook.md", "- [ ] 2025-10-02 Draft +p\n");
        seed(&layout, "contexts/readme.txt", "- [ ] 2025-10-02 Ignored +p\n");

        let report = collect_blockers(&layout, "p").unwrap();
        let labels: Vec<&str> = report.sources.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Waiting For", "Incubating", "Deferred", "@macbook", "@phone"]
        );
        assert_eq!(report.total(), 2);
        assert_eq!(report.sources[3].file, "contexts/macbook.md");
    }

    #[test]
    fn missing_sources_contribute_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        let report = collect_blockers(&layout, "p").unwrap();
        assert!(!report.is_blocking());
        assert_eq!(
            report.items_for("Waiting For").map(|items| items.is_empty()),
            Some(true)
        );
        assert_eq!(report.items_for("@nowhere"), None);
    }

    #[test]
    fn completed_archive_never_blocks() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        seed(&layout, COMPLETED_LIST, "- [ ] 2025-10-01 Still open in archive +p\n");
        seed(&layout, "@deferred.md", "- [x] 2025-10-01 Resolved +p\n");

        let report = collect_blockers(&layout, "p").unwrap();
        assert!(!report.is_blocking());
    }

    #[test]
    fn report_renders_only_sources_with_items() {
        let dir = tempfile::tempdir().unwrap();
        let layout = CorpusLayout::new(dir.path());
        seed(&layout, "@waiting.md", "- [ ] 2025-10-28 Reply from vendor +p\n");
        seed(&layout, "contexts/home.md", "- [ ] 2025-10-29 Measure shelf @home +p\n");

        let rendered = collect_blockers(&layout, "p").unwrap().to_string();
        assert_eq!(
            rendered,
            "Waiting For (@waiting.md):\n  • 2025-10-28 Reply from vendor\n\n\
@home (contexts/home.md):\n  • 2025-10-29 Measure shelf\n"
        );
    }
}
