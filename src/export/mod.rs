//! Exporting a session log to a standalone HTML file
//!
//! [`Exporter`] wires the log reader and renderer between a [`SessionSource`] and an
//! [`OutputSink`]. Anomalies found while reading are returned with the report and
//! never stop an export; a log with no readable records does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::{ExportError, SourceError};
use crate::models::Anomaly;
use crate::parsers::{DecodeOptions, read_transcript};
use crate::render::render_document;

pub mod sink;
pub mod source;

pub use sink::{AtomicFileSink, OutputSink};
#[cfg(test)]
pub use source::MemorySource;
pub use source::{FileSource, SessionSource};

/// Characters of the session id kept in default file names
const OUTPUT_ID_CHARS: usize = 12;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub decode: DecodeOptions,
    /// Explicit output file; otherwise a default name in `output_dir`
    pub output: Option<PathBuf>,
    /// Directory for default names; the working directory when `None`
    pub output_dir: Option<PathBuf>,
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub output: PathBuf,
    /// Top-level transcript entries written
    pub messages: usize,
    pub anomalies: Vec<Anomaly>,
}

/// `claude-session-<first 12 chars of id>.html`
pub fn default_output_name(session_id: &str) -> String {
    let short: String = session_id.chars().take(OUTPUT_ID_CHARS).collect();
    format!("claude-session-{short}.html")
}

pub fn session_id_of(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default()
}

#[derive(Clone)]
pub struct Exporter {
    source: Arc<dyn SessionSource>,
    sink: Arc<dyn OutputSink>,
    options: ExportOptions,
}

impl Exporter {
    pub fn new(
        source: Arc<dyn SessionSource>,
        sink: Arc<dyn OutputSink>,
        options: ExportOptions,
    ) -> Self {
        Self { source, sink, options }
    }

    /// Exporter reading from and writing to the local filesystem
    pub fn filesystem(options: ExportOptions) -> Self {
        Self::new(Arc::new(FileSource), Arc::new(AtomicFileSink), options)
    }

    /// Where the export of `path` will be written
    pub fn destination_for(&self, path: &Path) -> PathBuf {
        if let Some(output) = &self.options.output {
            return output.clone();
        }
        let name = default_output_name(&session_id_of(path));
        match &self.options.output_dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        }
    }

    pub fn export(&self, path: &Path) -> Result<ExportReport, ExportError> {
        let destination = self.destination_for(path);
        self.export_to(path, &destination)
    }

    pub fn export_to(&self, path: &Path, destination: &Path) -> Result<ExportReport, ExportError> {
        let reader = self.source.open(path)?;
        let transcript = read_transcript(reader, &self.options.decode)
            .map_err(|source| SourceError::Io { path: path.to_path_buf(), source })?;

        if transcript.document.is_empty() {
            return Err(ExportError::Empty(path.display().to_string()));
        }
        for anomaly in &transcript.anomalies {
            warn!(path = %path.display(), "{anomaly}");
        }

        let html = render_document(
            &transcript.document,
            &transcript.meta,
            &transcript.anomalies,
            Utc::now(),
        )?;
        self.sink.write(&html, destination)?;

        info!(
            path = %path.display(),
            output = %destination.display(),
            messages = transcript.document.len(),
            "exported session"
        );
        Ok(ExportReport {
            output: destination.to_path_buf(),
            messages: transcript.document.len(),
            anomalies: transcript.anomalies,
        })
    }
}
