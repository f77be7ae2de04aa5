//! Core domain logic for the execution-system corpus.
//! This crate is the single source of truth for project lifecycle invariants.

pub mod codec;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scan;
pub mod service;

pub use codec::frontmatter::{
    parse_frontmatter, serialize_frontmatter, split_document, with_completion_date, Frontmatter,
    FrontmatterError,
};
pub use config::{AreaConfig, ConfigError, ExecConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::action::{ActionLine, ItemMarker};
pub use model::project::{project_identifier, LifecycleFolder, ProjectType};
pub use repo::layout::CorpusLayout;
pub use repo::project_locator::{locate_active_project, LocateError, LocatedProject};
pub use scan::blockers::{collect_blockers, BlockerReport, BlockerScanError, SourceBlockers};
pub use scan::tag_scanner::{scan_blocking_items, BlockingItem};
pub use service::completion_service::{
    CompletionError, CompletionOutcome, CompletionReport, CompletionService, Rejection,
};

/// Tool entry point: completes the active project titled `title`.
///
/// Never fails; every problem comes back as `CompletionOutcome::Rejected`.
pub fn complete_project(config: &ExecConfig, title: &str) -> CompletionOutcome {
    CompletionService::new(config.layout()).complete(title)
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
