use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A discovered session, as listed in the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: String,
    /// First user prompt, used as the display title
    pub title: String,
    pub project: String,
    pub path: PathBuf,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub git_branch: Option<String>,
    pub message_count: usize,
}

impl SessionSummary {
    /// Newest of modified/created, for sorting
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.modified.or(self.created)
    }

    /// Text the browser filter matches against. Leaves out the log's directory,
    /// which every session under the same root shares.
    pub fn haystack(&self) -> String {
        let mut text = String::with_capacity(self.title.len() + self.project.len() + 64);
        text.push_str(&self.project);
        text.push(' ');
        text.push_str(&self.session_id);
        text.push(' ');
        text.push_str(&self.title);
        if let Some(branch) = &self.git_branch {
            text.push(' ');
            text.push_str(branch);
        }
        if let Some(stem) = self.path.file_stem()
            && stem.to_string_lossy() != self.session_id
        {
            text.push(' ');
            text.push_str(&stem.to_string_lossy());
        }
        text
    }
}

/// Session-wide facts collected while decoding (first value seen wins)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionMeta {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub git_branch: Option<String>,
    pub model: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
}

impl SessionMeta {
    pub fn merge(&mut self, other: SessionMeta) {
        if self.session_id.is_none() {
            self.session_id = other.session_id;
        }
        if self.cwd.is_none() {
            self.cwd = other.cwd;
        }
        if self.git_branch.is_none() {
            self.git_branch = other.git_branch;
        }
        if self.model.is_none() {
            self.model = other.model;
        }
        if self.started_at.is_none() {
            self.started_at = other.started_at;
        }
    }

    /// Label/value pairs shown in document and preview headers
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(started) = &self.started_at {
            fields.push(("Date", started.format("%Y-%m-%d %H:%M UTC").to_string()));
        }
        if let Some(model) = &self.model {
            fields.push(("Model", model.clone()));
        }
        if let Some(cwd) = &self.cwd {
            fields.push(("Directory", cwd.clone()));
        }
        if let Some(branch) = &self.git_branch {
            fields.push(("Branch", branch.clone()));
        }
        if let Some(session_id) = &self.session_id {
            fields.push(("Session", session_id.clone()));
        }
        fields
    }
}
