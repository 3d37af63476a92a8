//! Session discovery under the Claude projects directory
//!
//! # Error Handling Strategy
//!
//! Discovery degrades gracefully:
//!
//! - **Project-level failures**: Unreadable or symlinked project directories are logged with
//!   `tracing::warn!` and skipped.
//!
//! - **Index failures**: A corrupt `sessions-index.json` is logged and ignored; the project's
//!   logs are still listed from their file names and first prompts.
//!
//! - **Resource limits**: Absurd numbers of projects or logs fail the whole scan, since that
//!   points at a misconfigured directory rather than a damaged file.

use std::path::PathBuf;

use anyhow::Result;

use crate::models::SessionSummary;

pub mod project_discovery;
pub mod resolve;
pub mod sessions;

pub use project_discovery::discover_projects;
pub use resolve::resolve_session;
pub use sessions::find_sessions;

/// Produces the ordered list of sessions the browser and `list` work from
pub trait SessionLocator {
    fn locate(&self, filter: Option<&str>) -> Result<Vec<SessionSummary>>;
}

/// Locates sessions on disk under a Claude projects directory
#[derive(Debug, Clone)]
pub struct ClaudeProjectsLocator {
    projects_dir: PathBuf,
}

impl ClaudeProjectsLocator {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self { projects_dir: projects_dir.into() }
    }

    pub fn projects_dir(&self) -> &std::path::Path {
        &self.projects_dir
    }
}

impl SessionLocator for ClaudeProjectsLocator {
    fn locate(&self, filter: Option<&str>) -> Result<Vec<SessionSummary>> {
        find_sessions(&self.projects_dir, filter)
    }
}
