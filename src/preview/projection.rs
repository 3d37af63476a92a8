//! Plain-text projection of a document for the browser's preview pane

use crate::models::{Child, DocumentModel, Node, SessionMeta};
use crate::render::format_tool_input;
use crate::utils::terminal::strip_ansi_codes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Top-level entries shown
    pub max_nodes: usize,
    /// Characters kept per entry
    pub max_chars: usize,
    /// Lines read from the log before giving up on filling the preview
    pub max_lines: usize,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self { max_nodes: 4, max_chars: 500, max_lines: 400 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewRole {
    Human,
    Claude,
    System,
    /// A tool call, result or thinking block outside any turn
    Detached,
}

impl PreviewRole {
    pub fn label(&self) -> &'static str {
        match self {
            PreviewRole::Human => "Human",
            PreviewRole::Claude => "Claude",
            PreviewRole::System => "System",
            PreviewRole::Detached => "Tool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub role: PreviewRole,
    pub text: String,
}

/// Bounded, markup-free view of the head of a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub meta: SessionMeta,
    pub entries: Vec<PreviewEntry>,
    /// Number of anomalies met in the part that was read
    pub anomalies: usize,
    /// More content exists past what is shown
    pub truncated: bool,
}

pub fn project(
    document: &DocumentModel,
    meta: &SessionMeta,
    anomalies: usize,
    options: &PreviewOptions,
) -> Preview {
    let entries = document
        .nodes()
        .iter()
        .take(options.max_nodes)
        .filter_map(|node| {
            let (role, text) = match node {
                Node::User(entry) => (PreviewRole::Human, strip_markup(&entry.content)),
                Node::Turn(turn) if turn.content.trim().is_empty() => {
                    (PreviewRole::Claude, summarize_children(&turn.children))
                }
                Node::Turn(turn) => (PreviewRole::Claude, strip_markup(&turn.content)),
                Node::System(entry) => (PreviewRole::System, strip_markup(&entry.content)),
                Node::Detached(child) => {
                    (PreviewRole::Detached, summarize_children(std::slice::from_ref(child)))
                }
            };
            let text = cap_chars(text.trim(), options.max_chars);
            (!text.is_empty()).then_some(PreviewEntry { role, text })
        })
        .collect();

    Preview {
        meta: meta.clone(),
        entries,
        anomalies,
        truncated: document.len() > options.max_nodes,
    }
}

/// One line per tool call or result, used when a turn has no prose
fn summarize_children(children: &[Child]) -> String {
    let first_line = |text: &str| strip_ansi_codes(text.lines().next().unwrap_or_default());
    children
        .iter()
        .filter_map(|child| match child {
            Child::ToolCall(call) => {
                let input = format_tool_input(&call.name, &call.input).unwrap_or_default();
                let line = format!("[{}] {}", strip_ansi_codes(&call.name), first_line(&input));
                Some(line.trim_end().to_string())
            }
            Child::ToolResult(result) => {
                let label = if result.is_error { "error" } else { "output" };
                Some(format!("[{label}] {}", first_line(&result.content)).trim_end().to_string())
            }
            Child::Thinking(_) | Child::System(_) => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Removes terminal escapes and the most visible markdown syntax
pub fn strip_markup(text: &str) -> String {
    let clean = strip_ansi_codes(text);
    let mut out = Vec::new();
    let mut last_blank = false;

    for line in clean.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            continue;
        }
        let line = trimmed
            .trim_start_matches('#')
            .trim_start_matches('>')
            .trim_start();
        let line = strip_inline(line);

        let blank = line.trim().is_empty();
        if blank && last_blank {
            continue;
        }
        last_blank = blank;
        out.push(line);
    }
    out.join("\n")
}

/// Drops emphasis markers and link targets: `**a** [b](c)` becomes `a b`
fn strip_inline(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' | '`' => {}
            '_' if chars.peek() == Some(&'_') => {
                chars.next();
            }
            ']' if chars.peek() == Some(&'(') => {
                for next in chars.by_ref() {
                    if next == ')' {
                        break;
                    }
                }
            }
            '[' => {}
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::models::{EventKind, EventRecord};
    use crate::parsers::build_transcript;

    fn user(line: usize, text: &str) -> crate::parsers::DecodeResult {
        Ok(EventRecord::new(line, EventKind::UserMessage, text))
    }

    #[test]
    fn test_projects_first_nodes_only() {
        let output = build_transcript((1..=6).map(|i| user(i, &format!("message {i}"))));
        let preview =
            project(&output.document, &SessionMeta::default(), 0, &PreviewOptions::default());

        assert_eq!(preview.entries.len(), 4);
        assert_eq!(preview.entries[3].text, "message 4");
        assert!(preview.truncated);
    }

    #[test]
    fn test_caps_entry_length() {
        let long = "a".repeat(600);
        let output = build_transcript(vec![user(1, &long)]);
        let preview =
            project(&output.document, &SessionMeta::default(), 0, &PreviewOptions::default());

        assert_eq!(preview.entries[0].text.chars().count(), 503);
        assert!(preview.entries[0].text.ends_with("..."));
    }

    #[test]
    fn test_turn_without_prose_lists_tools() {
        let output = build_transcript(vec![
            Ok(EventRecord::new(1, EventKind::AssistantMessage { model: None }, "")),
            Ok(EventRecord::new(
                2,
                EventKind::ToolCall {
                    name: "Bash".to_string(),
                    input: json!({"command": "cargo build"}),
                },
                "",
            )
            .with_id("t1")),
        ]);
        let preview =
            project(&output.document, &SessionMeta::default(), 0, &PreviewOptions::default());

        assert_eq!(preview.entries[0].role, PreviewRole::Claude);
        assert_eq!(preview.entries[0].text, "[Bash] $ cargo build");
    }

    #[test]
    fn test_strip_markup() {
        let text = concat!(
            "# Title\n\n\n**bold** and `code` see [docs](https://x.y)\n",
            "```rust\nfn main() {}\n```\n> quoted"
        );
        assert_eq!(strip_markup(text), "Title\n\nbold and code see docs\nfn main() {}\nquoted");
    }

    #[test]
    fn test_strip_markup_removes_escapes() {
        assert_eq!(strip_markup("\x1b[31mred\x1b[0m"), "red");
    }
}
