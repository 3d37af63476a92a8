//! Live session previews for the terminal browser
//!
//! A preview is a separate, bounded read of a session log: only the first few
//! top-level entries, stripped to plain text. Work runs on one background thread
//! ([`PreviewService`]); the newest request always wins.

pub mod cache;
pub mod projection;
pub mod worker;

pub use cache::PreviewCache;
pub use projection::{Preview, PreviewEntry, PreviewOptions, PreviewRole, project, strip_markup};
pub use worker::{PreviewRequest, PreviewResult, PreviewService, build_preview};
