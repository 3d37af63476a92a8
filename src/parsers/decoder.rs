//! Line-level decoding of session logs.
//!
//! [`decode_line`] is pure: one line in, the records it carries (or a
//! [`DecodeError`]) out. A flat record line yields exactly one record. A Claude Code
//! assistant line yields the assistant message followed by its thinking and tool
//! call blocks; a user line carrying tool results yields one record per result.
//! Lines that are valid but not part of the conversation (summaries, snapshots,
//! sidechain traffic) yield nothing.

use serde_json::Value;

use crate::error::{DecodeError, DecodeFailure};
use crate::models::log_line::{ClaudeLine, ContentBlock, FlatRecord, MessageContent};
use crate::models::{EventKind, EventRecord, SessionMeta};

/// Default cap on tool output kept per result
pub const DEFAULT_MAX_TOOL_OUTPUT_CHARS: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub max_tool_output_chars: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self { max_tool_output_chars: DEFAULT_MAX_TOOL_OUTPUT_CHARS }
    }
}

/// Records carried by one line plus any session facts it mentions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedLine {
    pub records: Vec<EventRecord>,
    pub meta: SessionMeta,
}

pub fn decode_line(
    line_number: usize,
    line: &str,
    options: &DecodeOptions,
) -> Result<DecodedLine, DecodeError> {
    let fail = |reason| DecodeError { line: line_number, reason };

    let value: Value = serde_json::from_str(line)
        .map_err(|e| fail(DecodeFailure::Malformed(e.to_string())))?;
    let Some(object) = value.as_object() else {
        return Err(fail(DecodeFailure::Malformed("expected a JSON object".to_string())));
    };

    if object.contains_key("kind") {
        decode_flat(line_number, value, options)
    } else if object.contains_key("type") {
        decode_claude(line_number, value, options)
    } else {
        Err(fail(DecodeFailure::MissingField { kind: "record", field: "kind" }))
    }
}

fn decode_flat(
    line_number: usize,
    value: Value,
    options: &DecodeOptions,
) -> Result<DecodedLine, DecodeError> {
    let fail = |reason| DecodeError { line: line_number, reason };
    let record: FlatRecord = serde_json::from_value(value)
        .map_err(|e| fail(DecodeFailure::Malformed(e.to_string())))?;

    let content = record.content.unwrap_or_default();
    let kind = match normalize_kind(&record.kind).as_str() {
        "usermessage" | "user" => EventKind::UserMessage,
        "assistantmessage" | "assistant" => {
            EventKind::AssistantMessage { model: record.model.clone() }
        }
        "thinkingblock" | "thinking" => EventKind::ThinkingBlock,
        "toolcall" => {
            if record.id.is_none() {
                return Err(fail(DecodeFailure::MissingField { kind: "tool_call", field: "id" }));
            }
            let name = record
                .name
                .ok_or(fail(DecodeFailure::MissingField { kind: "tool_call", field: "name" }))?;
            EventKind::ToolCall { name, input: record.input.unwrap_or(Value::Null) }
        }
        "toolresult" => {
            if record.id.is_none() {
                return Err(fail(DecodeFailure::MissingField { kind: "tool_result", field: "id" }));
            }
            EventKind::ToolResult { is_error: record.is_error }
        }
        "systemnote" | "system" => EventKind::SystemNote { subtype: record.subtype },
        _ => return Err(fail(DecodeFailure::UnknownKind(record.kind))),
    };

    let content = match kind {
        EventKind::ToolResult { .. } => truncate_output(content, options.max_tool_output_chars),
        _ => content,
    };

    let meta = SessionMeta {
        session_id: record.session_id,
        cwd: record.cwd,
        git_branch: record.git_branch,
        model: record.model,
        started_at: record.timestamp,
    };

    let event = EventRecord {
        line: line_number,
        kind,
        id: record.id,
        parent_id: record.parent_id,
        timestamp: record.timestamp,
        content,
    };

    Ok(DecodedLine { records: vec![event], meta })
}

fn decode_claude(
    line_number: usize,
    value: Value,
    options: &DecodeOptions,
) -> Result<DecodedLine, DecodeError> {
    let fail = |reason| DecodeError { line: line_number, reason };
    let line: ClaudeLine = serde_json::from_value(value)
        .map_err(|e| fail(DecodeFailure::Malformed(e.to_string())))?;

    let mut decoded = DecodedLine {
        records: Vec::new(),
        meta: SessionMeta {
            session_id: line.session_id.clone(),
            cwd: line.cwd.clone(),
            git_branch: line.git_branch.clone(),
            model: None,
            started_at: line.timestamp,
        },
    };

    // Sidechains are subagent traffic, not part of the main conversation
    if line.is_sidechain {
        return Ok(decoded);
    }

    let timestamp = line.timestamp;
    match line.entry_type.as_str() {
        "user" => {
            let message = line
                .message
                .ok_or(fail(DecodeFailure::MissingField { kind: "user", field: "message" }))?;
            match message.content {
                MessageContent::Text(text) => {
                    if !text.trim().is_empty() {
                        decoded.records.push(
                            EventRecord::new(line_number, EventKind::UserMessage, text)
                                .with_timestamp(timestamp),
                        );
                    }
                }
                MessageContent::Blocks(blocks) => {
                    let has_tool_result =
                        blocks.iter().any(|b| matches!(b, ContentBlock::ToolResult { .. }));
                    if has_tool_result {
                        for block in blocks {
                            if let ContentBlock::ToolResult { tool_use_id, content, is_error } =
                                block
                            {
                                let output = truncate_output(
                                    tool_output_text(&content),
                                    options.max_tool_output_chars,
                                );
                                decoded.records.push(
                                    EventRecord::new(
                                        line_number,
                                        EventKind::ToolResult { is_error },
                                        output,
                                    )
                                    .with_id(tool_use_id.clone())
                                    .with_parent(tool_use_id)
                                    .with_timestamp(timestamp),
                                );
                            }
                        }
                    } else {
                        let texts: Vec<String> = blocks
                            .into_iter()
                            .filter_map(|b| match b {
                                ContentBlock::Text { text } if !text.trim().is_empty() => {
                                    Some(text)
                                }
                                _ => None,
                            })
                            .collect();
                        if !texts.is_empty() {
                            decoded.records.push(
                                EventRecord::new(
                                    line_number,
                                    EventKind::UserMessage,
                                    texts.join("\n\n"),
                                )
                                .with_timestamp(timestamp),
                            );
                        }
                    }
                }
            }
        }
        "assistant" => {
            let message = line.message.ok_or(fail(DecodeFailure::MissingField {
                kind: "assistant",
                field: "message",
            }))?;
            decoded.meta.model = message.model.clone();

            let blocks = match message.content {
                MessageContent::Text(text) => vec![ContentBlock::Text { text }],
                MessageContent::Blocks(blocks) => blocks,
            };

            let mut texts = Vec::new();
            let mut children = Vec::new();
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => {
                        if !text.trim().is_empty() {
                            texts.push(text);
                        }
                    }
                    ContentBlock::Thinking { thinking } => {
                        if !thinking.trim().is_empty() {
                            children.push(
                                EventRecord::new(line_number, EventKind::ThinkingBlock, thinking)
                                    .with_timestamp(timestamp),
                            );
                        }
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        let name = if name.is_empty() { "unknown".to_string() } else { name };
                        children.push(
                            EventRecord::new(
                                line_number,
                                EventKind::ToolCall { name, input },
                                String::new(),
                            )
                            .with_id(id)
                            .with_timestamp(timestamp),
                        );
                    }
                    // Tool results only appear on user lines
                    ContentBlock::ToolResult { .. } | ContentBlock::Other => {}
                }
            }

            let mut head = EventRecord::new(
                line_number,
                EventKind::AssistantMessage { model: message.model },
                texts.join("\n\n"),
            )
            .with_timestamp(timestamp);
            head.id = message.id.clone();
            decoded.records.push(head);

            for mut child in children {
                child.parent_id = message.id.clone();
                decoded.records.push(child);
            }
        }
        "system" => {
            let text = match line.content {
                Some(Value::String(text)) => text,
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            if !text.trim().is_empty() {
                decoded.records.push(
                    EventRecord::new(
                        line_number,
                        EventKind::SystemNote { subtype: line.subtype },
                        text,
                    )
                    .with_id(line.uuid.unwrap_or_default())
                    .with_timestamp(timestamp),
                );
            }
        }
        // Non-conversation entries (summary, file-history-snapshot, ...) carry no records
        _ => {}
    }

    Ok(decoded)
}

fn normalize_kind(kind: &str) -> String {
    kind.chars().filter(|c| *c != '_' && *c != '-').flat_map(char::to_lowercase).collect()
}

/// Flattens a tool result body: text parts joined by newlines, strings as-is
pub fn tool_output_text(content: &Value) -> String {
    match content {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|item| item.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// Cuts output longer than `limit` characters and notes the original length
pub fn truncate_output(text: String, limit: usize) -> String {
    let total = text.chars().count();
    if total <= limit {
        return text;
    }
    let mut out: String = text.chars().take(limit).collect();
    out.push_str(&format!("\n\n... [truncated, {} chars total]", total));
    out
}
