//! HTML rendering of session documents
//!
//! Rendering is pure: a [`crate::models::DocumentModel`] plus session facts in, one
//! self-contained HTML string out. All content is escaped; markdown and syntax
//! highlighting happen in the viewer's browser via the assets in [`assets`].

pub mod assets;
pub mod html;
pub mod tools;

pub use html::{escape_html, render_body, render_document};
pub use tools::{format_tool_input, tool_icon};
