//! Error taxonomy for the export pipeline.
//!
//! Decode problems and pairing problems are never errors here: they become
//! [`crate::models::Anomaly`] values. Everything below aborts exactly one operation
//! (one export or one preview) and is reported to whoever started it.

use std::path::PathBuf;

/// Why a single log line could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("unknown record kind '{0}'")]
    UnknownKind(String),

    #[error("missing required field '{field}' for {kind}")]
    MissingField { kind: &'static str, field: &'static str },
}

/// A line that failed to decode. Collected, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct DecodeError {
    pub line: usize,
    pub reason: DecodeFailure,
}

/// The session log could not be read
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Failed to read session log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session log too large: {path} ({size} bytes, max {max} bytes)")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Refusing to follow symlink: {0}")]
    Symlink(PathBuf),
}

/// Rendering hit a broken document invariant
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("tool result at line {line} points at child {call_index}, which is not a tool call")]
    DanglingPairing { line: usize, call_index: usize },

    #[error("failed to serialize tool input at line {line}: {source}")]
    ToolInput {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// The rendered document could not be written to its destination
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Output directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("No messages found in session {0}")]
    Empty(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("No readable records in session")]
    Empty,
}
