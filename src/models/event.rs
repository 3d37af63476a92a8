use chrono::{DateTime, Utc};
use serde_json::Value;

/// Kind of a decoded log record, carrying the metadata specific to that kind
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    UserMessage,
    AssistantMessage { model: Option<String> },
    ThinkingBlock,
    ToolCall { name: String, input: Value },
    ToolResult { is_error: bool },
    SystemNote { subtype: Option<String> },
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::UserMessage => "user_message",
            EventKind::AssistantMessage { .. } => "assistant_message",
            EventKind::ThinkingBlock => "thinking_block",
            EventKind::ToolCall { .. } => "tool_call",
            EventKind::ToolResult { .. } => "tool_result",
            EventKind::SystemNote { .. } => "system_note",
        }
    }
}

/// One decoded log entry. Never modified after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// 1-based line number in the source log
    pub line: usize,
    pub kind: EventKind,
    /// Present on tool calls and results; message id on assistant messages
    pub id: Option<String>,
    pub parent_id: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub content: String,
}

impl EventRecord {
    pub fn new(line: usize, kind: EventKind, content: impl Into<String>) -> Self {
        Self { line, kind, id: None, parent_id: None, timestamp: None, content: content.into() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
