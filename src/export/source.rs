use std::io::{BufRead, BufReader};
use std::path::Path;
#[cfg(test)]
use std::path::PathBuf;

use crate::error::SourceError;
use crate::utils::safe_open_file;

/// Opens the raw bytes of a session log
pub trait SessionSource: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn BufRead + Send>, SourceError>;
}

/// Reads session logs from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl SessionSource for FileSource {
    fn open(&self, path: &Path) -> Result<Box<dyn BufRead + Send>, SourceError> {
        let file = safe_open_file(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Serves fixed logs from memory, keyed by path
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    logs: Vec<(PathBuf, Vec<u8>)>,
}

#[cfg(test)]
impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(mut self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.logs.push((path.into(), content.into()));
        self
    }
}

#[cfg(test)]
impl SessionSource for MemorySource {
    fn open(&self, path: &Path) -> Result<Box<dyn BufRead + Send>, SourceError> {
        let (_, bytes) = self
            .logs
            .iter()
            .find(|(p, _)| p == path)
            .ok_or_else(|| SourceError::NotFound(path.display().to_string()))?;
        Ok(Box::new(std::io::Cursor::new(bytes.clone())))
    }
}
