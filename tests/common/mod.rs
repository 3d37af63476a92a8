//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tempfile::TempDir;

pub const SESSION_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Builder for a temporary `.claude` directory with projects and session logs
pub struct ClaudeDirBuilder {
    temp_dir: TempDir,
}

impl ClaudeDirBuilder {
    /// Create a new builder with an empty `projects/` directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(temp_dir.path().join("projects")).expect("Failed to create projects dir");
        Self { temp_dir }
    }

    /// Path to the `.claude` directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.temp_dir.path().join("projects")
    }

    /// Add a session log `<id>.jsonl` to a project (created on demand)
    pub fn with_session(self, project: &str, session_id: &str, log: &SessionLog) -> Self {
        let project_dir = self.project_dir(project);
        fs::write(project_dir.join(format!("{session_id}.jsonl")), log.to_jsonl())
            .expect("Failed to write session log");
        self
    }

    /// Add a raw file to a project
    pub fn with_file(self, project: &str, name: &str, content: &str) -> Self {
        let project_dir = self.project_dir(project);
        fs::write(project_dir.join(name), content).expect("Failed to write file");
        self
    }

    /// Add a `sessions-index.json` with the given entries
    pub fn with_index(self, project: &str, entries: Value) -> Self {
        let index = json!({ "version": 1, "entries": entries });
        self.with_file(project, "sessions-index.json", &index.to_string())
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }

    fn project_dir(&self, project: &str) -> PathBuf {
        let dir = self.projects_dir().join(project);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        dir
    }
}

impl Default for ClaudeDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a Claude Code session log, one JSON value per line
#[derive(Default)]
pub struct SessionLog {
    lines: Vec<String>,
    session_id: String,
    cwd: String,
    branch: String,
    clock: i64,
}

impl SessionLog {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            session_id: SESSION_ID.to_string(),
            cwd: "/Users/test/work/app".to_string(),
            branch: "main".to_string(),
            clock: 0,
        }
    }

    pub fn cwd(mut self, cwd: &str) -> Self {
        self.cwd = cwd.to_string();
        self
    }

    /// A user prompt
    pub fn user(self, text: &str) -> Self {
        self.push("user", json!({ "role": "user", "content": text }))
    }

    /// An assistant message with text only
    pub fn assistant(self, message_id: &str, text: &str) -> Self {
        self.push(
            "assistant",
            json!({
                "id": message_id,
                "role": "assistant",
                "model": "claude-sonnet-4",
                "content": [{ "type": "text", "text": text }]
            }),
        )
    }

    /// An assistant message that calls a tool
    pub fn tool_use(self, message_id: &str, tool_id: &str, name: &str, input: Value) -> Self {
        self.push(
            "assistant",
            json!({
                "id": message_id,
                "role": "assistant",
                "model": "claude-sonnet-4",
                "content": [{ "type": "tool_use", "id": tool_id, "name": name, "input": input }]
            }),
        )
    }

    /// A user line carrying a tool result
    pub fn tool_result(self, tool_id: &str, output: &str, is_error: bool) -> Self {
        self.push(
            "user",
            json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": tool_id,
                    "content": output,
                    "is_error": is_error
                }]
            }),
        )
    }

    /// A line copied verbatim (malformed input, other record types)
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_jsonl(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    fn push(mut self, entry_type: &str, message: Value) -> Self {
        self.clock += 1;
        let line = json!({
            "type": entry_type,
            "sessionId": self.session_id,
            "cwd": self.cwd,
            "gitBranch": self.branch,
            "timestamp": format!("2024-03-01T10:{:02}:00Z", self.clock % 60),
            "uuid": format!("uuid-{}", self.clock),
            "message": message
        });
        self.lines.push(line.to_string());
        self
    }
}

/// A small realistic session: prompt, a tool round trip and a final answer
pub fn realistic_session() -> SessionLog {
    SessionLog::new()
        .user("Why does the build fail?")
        .tool_use("msg_1", "toolu_1", "Bash", json!({ "command": "cargo build" }))
        .tool_result("toolu_1", "error[E0425]: cannot find value `x`", true)
        .assistant("msg_2", "The variable `x` is not defined in **main.rs**.")
}
