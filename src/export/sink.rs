use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::SinkError;

/// Final destination of a rendered document
pub trait OutputSink: Send + Sync {
    fn write(&self, html: &str, destination: &Path) -> Result<(), SinkError>;
}

/// Writes to a temporary file beside the destination, then renames it into place.
///
/// A failed export leaves neither a partial file nor the temporary behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicFileSink;

impl OutputSink for AtomicFileSink {
    fn write(&self, html: &str, destination: &Path) -> Result<(), SinkError> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if !dir.is_dir() {
            return Err(SinkError::MissingDirectory(dir.to_path_buf()));
        }

        let io_err = |source| SinkError::Io { path: destination.to_path_buf(), source };

        let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(html.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(destination).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_atomic_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.html");
        fs::write(&target, "old").unwrap();

        AtomicFileSink.write("<html></html>", &target).unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "<html></html>");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.html");

        let err = AtomicFileSink.write("x", &target).unwrap_err();
        assert!(matches!(err, SinkError::MissingDirectory(_)));
        assert!(!target.exists());
    }
}
