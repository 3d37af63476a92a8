//! Claude Session Export - Turn Claude Code session logs into standalone HTML
//!
//! This library reads the append-only JSONL logs Claude Code keeps under
//! `~/.claude/projects/` and provides:
//!
//! - Decoding log lines into typed records, tolerating damaged lines
//! - Building an ordered transcript with tool calls paired to their results
//! - Rendering a deterministic, fully escaped HTML document
//! - Bounded, cancellable previews and an interactive terminal browser
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use claude_session_export::export::{ExportOptions, Exporter};
//!
//! let exporter = Exporter::filesystem(ExportOptions::default());
//! let report = exporter.export(Path::new("session.jsonl"))?;
//! println!("Exported {} messages to {}", report.messages, report.output.display());
//! # Ok::<(), claude_session_export::error::ExportError>(())
//! ```

pub mod cli;
pub mod error;
pub mod export;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod preview;
pub mod render;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use error::{DecodeError, ExportError};
pub use export::{ExportReport, Exporter};
pub use models::{Anomaly, DocumentModel, EventRecord, SessionSummary};
pub use parsers::{build_transcript, decode_line, read_transcript};
pub use render::render_document;
