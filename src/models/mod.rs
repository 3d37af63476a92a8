//! Data models for session logs and exported documents.
//!
//! - [`EventRecord`] - One decoded log record (closed set of kinds in [`EventKind`])
//! - [`DocumentModel`] - Ordered, read-only tree of transcript nodes
//! - [`Anomaly`] - Non-fatal problems found while building a document
//! - [`SessionSummary`] - A discovered session as listed in the browser
//! - [`SessionMeta`] - Session-wide facts (cwd, branch, model) collected while decoding
//!
//! Raw line shapes used by the decoder live in [`log_line`].

pub mod document;
pub mod event;
pub mod log_line;
pub mod project;
pub mod session;

pub use document::{
    Anomaly, Child, DocumentModel, Node, Origin, Pairing, SystemEntry, TextEntry, ToolCallEntry,
    ToolResultEntry, Turn,
};
pub use event::{EventKind, EventRecord};
pub use project::ProjectInfo;
pub use session::{SessionMeta, SessionSummary};
