//! Building [`SessionSummary`] lists for the browser and `list` command.
//!
//! Each project contributes the entries of its `sessions-index.json` first, then
//! every log the index does not mention. Unindexed logs are summarised from their
//! first user message; those reads run in parallel with rayon.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::log_line::{ClaudeLine, ContentBlock, MessageContent};
use crate::models::{ProjectInfo, SessionSummary};
use crate::parsers::deserializers::deserialize_optional_timestamp;
use crate::utils::{display_project_name, safe_open_file};

use super::project_discovery::discover_projects;

/// Titles longer than this are cut
const MAX_TITLE_CHARS: usize = 200;

/// Lines read from an unindexed log while looking for its first prompt
const MAX_STUB_LINES: usize = 200;

#[derive(Debug, Default, Deserialize)]
struct SessionsIndex {
    #[serde(default)]
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexEntry {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    full_path: String,
    #[serde(default)]
    first_prompt: String,
    #[serde(default)]
    project_path: String,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    modified: Option<DateTime<Utc>>,
    #[serde(default)]
    git_branch: Option<String>,
    #[serde(default)]
    message_count: usize,
}

/// What can be learned cheaply from the head of an unindexed log
#[derive(Debug, Default, PartialEq)]
struct SessionStub {
    first_prompt: String,
    created: Option<DateTime<Utc>>,
    git_branch: Option<String>,
    cwd: Option<String>,
}

/// All sessions under `projects_dir`, newest first
pub fn find_sessions(projects_dir: &Path, filter: Option<&str>) -> Result<Vec<SessionSummary>> {
    let projects = discover_projects(projects_dir, filter)?;

    let mut sessions: Vec<SessionSummary> =
        projects.par_iter().flat_map_iter(project_sessions).collect();

    // Stable: ties keep discovery order
    sessions.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
    debug!(sessions = sessions.len(), projects = projects.len(), "discovered sessions");
    Ok(sessions)
}

fn project_sessions(project: &ProjectInfo) -> Vec<SessionSummary> {
    let mut sessions = Vec::new();

    if let Some(index_path) = &project.index_file {
        for entry in read_index(index_path) {
            let path = index_entry_path(&project.project_dir, &entry.full_path, &entry.session_id);
            let label_source =
                if entry.project_path.is_empty() { &project.dir_name } else { &entry.project_path };
            sessions.push(SessionSummary {
                project: display_project_name(label_source),
                title: clean_title(&entry.first_prompt),
                session_id: entry.session_id,
                path,
                created: entry.created,
                modified: entry.modified,
                git_branch: entry.git_branch.filter(|b| !b.is_empty()),
                message_count: entry.message_count,
            });
        }
    }

    let unindexed: Vec<&PathBuf> = project
        .session_files
        .iter()
        .filter(|file| {
            let stem = session_id_from_path(file);
            !sessions.iter().any(|s| s.session_id == stem || &s.path == *file)
        })
        .collect();

    let stubs: Vec<SessionSummary> = unindexed
        .par_iter()
        .map(|file| {
            let stub = read_session_stub(file);
            let modified = fs::metadata(file).and_then(|m| m.modified()).ok().map(DateTime::from);
            let label_source = stub.cwd.as_deref().unwrap_or(&project.dir_name);
            SessionSummary {
                session_id: session_id_from_path(file),
                title: clean_title(&stub.first_prompt),
                project: display_project_name(label_source),
                path: (*file).clone(),
                created: stub.created,
                modified,
                git_branch: stub.git_branch,
                message_count: 0,
            }
        })
        .collect();

    sessions.extend(stubs);
    sessions
}

fn read_index(path: &Path) -> Vec<IndexEntry> {
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str::<SessionsIndex>(&text).map_err(|e| e.to_string()));
    match parsed {
        Ok(index) => index.entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "sessions index read failed");
            Vec::new()
        }
    }
}

pub(crate) fn index_entry_path(project_dir: &Path, entry_path: &str, session_id: &str) -> PathBuf {
    if entry_path.is_empty() {
        return project_dir.join(format!("{session_id}.jsonl"));
    }
    let path = PathBuf::from(entry_path);
    if path.is_absolute() { path } else { project_dir.join(path) }
}

fn session_id_from_path(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
}

fn clean_title(prompt: &str) -> String {
    let single_line = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    single_line.chars().take(MAX_TITLE_CHARS).collect()
}

/// First user prompt, creation time, branch and cwd of a log; empty on any failure
fn read_session_stub(path: &Path) -> SessionStub {
    let file = match safe_open_file(path) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "session stub read failed");
            return SessionStub::default();
        }
    };

    let mut stub = SessionStub::default();
    for line in BufReader::new(file).lines().take(MAX_STUB_LINES) {
        let Ok(line) = line else { break };
        let Ok(entry) = serde_json::from_str::<ClaudeLine>(&line) else {
            continue;
        };
        if stub.cwd.is_none() {
            stub.cwd = entry.cwd.clone();
        }
        if entry.entry_type != "user" || entry.is_sidechain {
            continue;
        }
        let prompt = match entry.message.map(|m| m.content) {
            Some(MessageContent::Text(text)) => text,
            Some(MessageContent::Blocks(blocks)) => blocks
                .into_iter()
                .find_map(|b| match b {
                    ContentBlock::Text { text } => Some(text),
                    _ => None,
                })
                .unwrap_or_default(),
            None => String::new(),
        };
        if prompt.trim().is_empty() {
            continue;
        }
        stub.first_prompt = prompt;
        stub.created = entry.timestamp;
        stub.git_branch = entry.git_branch.filter(|b| !b.is_empty());
        break;
    }
    stub
}

/// Log paths an index file lists for `session_id`
pub(crate) fn index_paths_for(
    index_path: &Path,
    project_dir: &Path,
    session_id: &str,
) -> Vec<PathBuf> {
    read_index(index_path)
        .into_iter()
        .filter(|entry| entry.session_id == session_id)
        .map(|entry| index_entry_path(project_dir, &entry.full_path, &entry.session_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_index_entries_then_unindexed_logs() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("-Users-me-app");
        fs::create_dir(&project).unwrap();
        fs::write(
            project.join("sessions-index.json"),
            r#"{"entries":[{"sessionId":"indexed","fullPath":"indexed.jsonl","firstPrompt":"Fix the\nbuild","projectPath":"/Users/me/work/app","modified":"2024-03-01T10:00:00Z","gitBranch":"main","messageCount":12}]}"#,
        )
        .unwrap();
        fs::write(project.join("indexed.jsonl"), "{}\n").unwrap();
        fs::write(
            project.join("loose.jsonl"),
            r#"{"type":"user","cwd":"/Users/me/work/app","gitBranch":"dev","timestamp":"2024-01-01T00:00:00Z","message":{"content":"Add tests"}}
"#,
        )
        .unwrap();

        let sessions = find_sessions(root.path(), None).unwrap();
        assert_eq!(sessions.len(), 2);

        let indexed = sessions.iter().find(|s| s.session_id == "indexed").unwrap();
        assert_eq!(indexed.title, "Fix the build");
        assert_eq!(indexed.project, "work/app");
        assert_eq!(indexed.message_count, 12);
        assert_eq!(indexed.path, project.join("indexed.jsonl"));

        let loose = sessions.iter().find(|s| s.session_id == "loose").unwrap();
        assert_eq!(loose.title, "Add tests");
        assert_eq!(loose.git_branch.as_deref(), Some("dev"));
        assert!(loose.created.is_some());
        assert!(loose.modified.is_some());
    }

    #[test]
    fn test_sessions_sorted_newest_first() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        fs::write(
            project.join("sessions-index.json"),
            r#"{"entries":[
                {"sessionId":"old","fullPath":"old.jsonl","modified":"2023-01-01T00:00:00Z"},
                {"sessionId":"new","fullPath":"new.jsonl","modified":"2024-01-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();

        let sessions = find_sessions(root.path(), None).unwrap();
        let ids: Vec<&str> = sessions.iter().map(|s| s.session_id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn test_corrupt_index_is_skipped() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("proj");
        fs::create_dir(&project).unwrap();
        fs::write(project.join("sessions-index.json"), "{not json").unwrap();
        let line = "{\"type\":\"user\",\"message\":{\"content\":\"hi\"}}\n";
        fs::write(project.join("abc.jsonl"), line).unwrap();

        let sessions = find_sessions(root.path(), None).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].title, "hi");
    }

    #[test]
    fn test_stub_skips_tool_results_and_sidechains() {
        let root = TempDir::new().unwrap();
        let log = root.path().join("s.jsonl");
        fs::write(
            &log,
            r#"{"type":"user","isSidechain":true,"message":{"content":"side"}}
{"type":"user","message":{"content":[{"type":"tool_result","tool_use_id":"t","content":"x"}]}}
not json
{"type":"user","message":{"content":[{"type":"text","text":"real prompt"}]}}
"#,
        )
        .unwrap();

        assert_eq!(read_session_stub(&log).first_prompt, "real prompt");
    }

    #[test]
    fn test_clean_title_truncates() {
        let long = "x".repeat(500);
        assert_eq!(clean_title(&long).chars().count(), MAX_TITLE_CHARS);
    }
}
