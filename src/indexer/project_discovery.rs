use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::models::ProjectInfo;
use crate::utils::validate_path_not_symlink;

/// Maximum number of projects to scan (prevents resource exhaustion)
const MAX_PROJECTS: usize = 1000;

/// Maximum number of session logs per project (prevents resource exhaustion)
const MAX_SESSION_FILES_PER_PROJECT: usize = 5000;

pub const SESSIONS_INDEX_FILE: &str = "sessions-index.json";

/// Discover project directories under `projects_dir` and their session logs
///
/// `filter` keeps only projects whose directory name contains it (case-insensitive).
/// Projects come back sorted by directory name; session files within a project are
/// sorted by file name. Subagent logs (`agent-*.jsonl`) are not sessions and are skipped.
///
/// Returns an empty Vec if `projects_dir` doesn't exist (not an error).
///
/// # Errors
///
/// Returns an error if:
/// - The projects directory exists but cannot be read
/// - More than [`MAX_PROJECTS`] projects are found
/// - A project has more than [`MAX_SESSION_FILES_PER_PROJECT`] session logs
///
/// Symlinked or unreadable project directories are logged and skipped.
pub fn discover_projects(projects_dir: &Path, filter: Option<&str>) -> Result<Vec<ProjectInfo>> {
    if !projects_dir.exists() {
        return Ok(Vec::new());
    }

    let filter = filter.map(str::to_lowercase).filter(|f| !f.is_empty());
    let entries = fs::read_dir(projects_dir)
        .with_context(|| format!("Failed to read projects directory: {}", projects_dir.display()))?;

    let mut projects = Vec::new();
    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        let dir_name = match path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => continue,
        };

        if let Err(e) = validate_path_not_symlink(&path) {
            warn!(project = %dir_name, error = %e, "skipping project directory");
            continue;
        }
        if !path.is_dir() {
            continue;
        }
        if let Some(filter) = &filter
            && !dir_name.to_lowercase().contains(filter.as_str())
        {
            continue;
        }

        if projects.len() >= MAX_PROJECTS {
            bail!(
                "Resource limit exceeded: Found more than {} projects. This may indicate a misconfiguration.",
                MAX_PROJECTS
            );
        }

        let files = match fs::read_dir(&path) {
            Ok(files) => files,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read project directory");
                continue;
            }
        };

        let mut session_files = Vec::new();
        for file in files.flatten() {
            let file_path = file.path();
            let Some(file_name) = file_path.file_name().map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };
            if !file_name.ends_with(".jsonl") || file_name.starts_with("agent-") {
                continue;
            }
            if validate_path_not_symlink(&file_path).is_err() {
                warn!(path = %file_path.display(), "skipping symlinked session log");
                continue;
            }
            if session_files.len() >= MAX_SESSION_FILES_PER_PROJECT {
                bail!(
                    "Resource limit exceeded: Project {} has more than {} session logs",
                    dir_name,
                    MAX_SESSION_FILES_PER_PROJECT
                );
            }
            session_files.push(file_path);
        }
        session_files.sort();

        let index_path = path.join(SESSIONS_INDEX_FILE);
        let index_file = index_path.is_file().then_some(index_path);

        projects.push(ProjectInfo { dir_name, project_dir: path, index_file, session_files });
    }

    projects.sort_by(|a, b| a.dir_name.cmp(&b.dir_name));
    Ok(projects)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn create_project_dir(projects_dir: &Path, name: &str, files: &[&str]) -> PathBuf {
        let project_dir = projects_dir.join(name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        for filename in files {
            fs::write(project_dir.join(filename), b"{}\n").expect("Failed to write file");
        }
        project_dir
    }

    #[test]
    fn test_discover_projects_with_valid_structure() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-test-project2", &["b.jsonl"]);
        create_project_dir(root.path(), "-Users-test-project1", &["a.jsonl", "c.jsonl"]);

        let projects = discover_projects(root.path(), None).unwrap();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].dir_name, "-Users-test-project1");
        assert_eq!(projects[0].session_files.len(), 2);
        assert!(projects[0].session_files[0].ends_with("a.jsonl"));
        assert!(projects[0].index_file.is_none());
    }

    #[test]
    fn test_discover_projects_missing_directory() {
        let root = TempDir::new().unwrap();
        let projects = discover_projects(&root.path().join("missing"), None).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_discover_projects_skips_agent_and_other_files() {
        let root = TempDir::new().unwrap();
        create_project_dir(
            root.path(),
            "proj",
            &["session.jsonl", "agent-123.jsonl", "notes.txt", "sessions-index.json"],
        );

        let projects = discover_projects(root.path(), None).unwrap();

        assert_eq!(projects[0].session_files.len(), 1);
        assert!(projects[0].index_file.is_some());
    }

    #[test]
    fn test_discover_projects_skips_non_directories() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("stray.jsonl"), b"{}").unwrap();
        create_project_dir(root.path(), "proj", &[]);

        let projects = discover_projects(root.path(), None).unwrap();
        assert_eq!(projects.len(), 1);
        assert!(projects[0].session_files.is_empty());
    }

    #[test]
    fn test_discover_projects_filter_is_case_insensitive() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-me-WebApp", &["a.jsonl"]);
        create_project_dir(root.path(), "-Users-me-cli", &["b.jsonl"]);

        let projects = discover_projects(root.path(), Some("webapp")).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].dir_name, "-Users-me-WebApp");
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_projects_skips_symlinked_project() {
        let root = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("a.jsonl"), b"{}").unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("linked")).unwrap();

        let projects = discover_projects(root.path(), None).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn test_discover_projects_max_projects_limit() {
        let root = TempDir::new().unwrap();
        for i in 0..=MAX_PROJECTS {
            fs::create_dir(root.path().join(format!("project{i}"))).unwrap();
        }

        let err = discover_projects(root.path(), None).unwrap_err();
        assert!(err.to_string().contains("Resource limit exceeded"));
    }
}
