use std::borrow::Cow;
use std::env;
use std::fs::{self, File};
use std::path::Path;

use crate::error::SourceError;

/// Largest session log we are willing to read (512MB)
pub const MAX_FILE_SIZE_BYTES: u64 = 512 * 1024 * 1024;

/// Opens a session log for reading after refusing symlinks and oversized files.
///
/// The size check runs on the opened handle so the file cannot be swapped
/// between the check and the read.
pub fn safe_open_file(path: &Path) -> Result<File, SourceError> {
    validate_path_not_symlink(path)?;
    let file = File::open(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
        _ => SourceError::Io { path: path.to_path_buf(), source },
    })?;
    validate_file_size(&file, path)?;
    Ok(file)
}

/// Rejects paths that are symlinks
pub fn validate_path_not_symlink(path: &Path) -> Result<(), SourceError> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            Err(SourceError::Symlink(path.to_path_buf()))
        }
        Ok(_) => Ok(()),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(SourceError::NotFound(path.display().to_string()))
        }
        Err(source) => Err(SourceError::Io { path: path.to_path_buf(), source }),
    }
}

/// Validates that a file's size is within [`MAX_FILE_SIZE_BYTES`]
pub fn validate_file_size(file: &File, path: &Path) -> Result<(), SourceError> {
    let metadata =
        file.metadata().map_err(|source| SourceError::Io { path: path.to_path_buf(), source })?;

    let size = metadata.len();
    if size > MAX_FILE_SIZE_BYTES {
        return Err(SourceError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: MAX_FILE_SIZE_BYTES,
        });
    }
    Ok(())
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

/// Internal helper for path formatting with optional home override (for testing)
pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}

/// Short project label: the last two meaningful segments of a project path
///
/// `/Users/alice/Projects/app` becomes `Projects/app`.
pub fn display_project_name(project_path: &str) -> String {
    let meaningful: Vec<&str> = project_path
        .trim_end_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "Users" && *segment != "home")
        .collect();

    match meaningful.as_slice() {
        [] => project_path.to_string(),
        [only] => (*only).to_string(),
        [.., parent, last] => format!("{parent}/{last}"),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::{NamedTempFile, TempDir};

    use super::*;

    #[test]
    fn test_safe_open_regular_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();
        assert!(safe_open_file(file.path()).is_ok());
    }

    #[test]
    fn test_safe_open_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = safe_open_file(&dir.path().join("nope.jsonl")).unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_open_rejects_symlink() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("real.jsonl");
        fs::write(&target, "{}\n").unwrap();
        let link = dir.path().join("link.jsonl");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = safe_open_file(&link).unwrap_err();
        assert!(matches!(err, SourceError::Symlink(_)));
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/Users/testuser/Documents/project");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/testuser"));
        assert_eq!(formatted, "~/Documents/project");

        let path2 = PathBuf::from("/opt/local/bin");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/local/bin");
    }

    #[test]
    fn test_display_project_name() {
        assert_eq!(display_project_name("/Users/alice/Projects/app"), "Projects/app");
        assert_eq!(display_project_name("/Users/alice/"), "alice");
        assert_eq!(display_project_name("/home/bob/work/api"), "work/api");
        assert_eq!(display_project_name("-Users-alice-app"), "-Users-alice-app");
        assert_eq!(display_project_name(""), "");
    }
}
