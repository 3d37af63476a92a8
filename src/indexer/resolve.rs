use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::SourceError;

use super::project_discovery::SESSIONS_INDEX_FILE;
use super::sessions::index_paths_for;

/// Turns a command-line session argument into a log path.
///
/// The argument is either an existing `.jsonl` file or a session id. Ids are
/// looked up in every project, first as `<project>/<id>.jsonl` and then through
/// the `fullPath` of a matching `sessions-index.json` entry.
pub fn resolve_session(arg: &str, projects_dir: &Path) -> Result<PathBuf, SourceError> {
    let direct = Path::new(arg);
    if direct.extension().is_some_and(|ext| ext == "jsonl") && direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    // Session ids are UUIDs; normalise case and braces when the argument parses as one
    let session_id = match Uuid::parse_str(arg) {
        Ok(uuid) => uuid.hyphenated().to_string(),
        Err(_) => arg.to_string(),
    };
    if session_id.is_empty() || session_id.contains(['/', '\\']) || session_id == ".." {
        return Err(SourceError::NotFound(arg.to_string()));
    }

    let entries = fs::read_dir(projects_dir).map_err(|_| {
        SourceError::NotFound(format!("{arg} ({} not found)", projects_dir.display()))
    })?;

    let mut project_dirs: Vec<PathBuf> =
        entries.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
    project_dirs.sort();

    for project_dir in &project_dirs {
        let candidate = project_dir.join(format!("{session_id}.jsonl"));
        if candidate.is_file() {
            debug!(path = %candidate.display(), "resolved session by file name");
            return Ok(candidate);
        }

        let index_path = project_dir.join(SESSIONS_INDEX_FILE);
        if index_path.is_file() {
            for full_path in index_paths_for(&index_path, project_dir, &session_id) {
                if full_path.is_file() {
                    debug!(path = %full_path.display(), "resolved session through index");
                    return Ok(full_path);
                }
            }
        }
    }

    Err(SourceError::NotFound(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_resolve_direct_path() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("any.jsonl");
        fs::write(&log, "{}\n").unwrap();

        let resolved = resolve_session(log.to_str().unwrap(), dir.path()).unwrap();
        assert_eq!(resolved, log);
    }

    #[test]
    fn test_resolve_by_id_in_any_project() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("-Users-me-app");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(format!("{ID}.jsonl")), "{}\n").unwrap();

        let resolved = resolve_session(&ID.to_uppercase(), root.path()).unwrap();
        assert_eq!(resolved, project.join(format!("{ID}.jsonl")));
    }

    #[test]
    fn test_resolve_through_index_full_path() {
        let root = TempDir::new().unwrap();
        let project = root.path().join("proj");
        fs::create_dir_all(project.join("archive")).unwrap();
        fs::write(project.join("archive/old.jsonl"), "{}\n").unwrap();
        fs::write(
            project.join("sessions-index.json"),
            r#"{"entries":[{"sessionId":"old-session","fullPath":"archive/old.jsonl"}]}"#,
        )
        .unwrap();

        let resolved = resolve_session("old-session", root.path()).unwrap();
        assert_eq!(resolved, project.join("archive/old.jsonl"));
    }

    #[test]
    fn test_resolve_unknown_session() {
        let root = TempDir::new().unwrap();
        let err = resolve_session("nope", root.path()).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_resolve_rejects_path_like_ids() {
        let root = TempDir::new().unwrap();
        assert!(resolve_session("../etc/passwd", root.path()).is_err());
    }
}
