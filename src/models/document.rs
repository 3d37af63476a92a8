//! The structured document built from a session log.
//!
//! A [`DocumentModel`] is an ordered list of top-level [`Node`]s. Assistant turns own
//! their children ([`Child`]) in the order they were emitted. Nothing in here is
//! mutable once [`crate::parsers::TranscriptBuilder::finish`] hands the model out.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Where an entry came from in the source log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    pub line: usize,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextEntry {
    pub origin: Origin,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemEntry {
    pub origin: Origin,
    pub content: String,
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallEntry {
    pub origin: Origin,
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Link from a tool result back to the call it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// `call_index` is the position of the call among the turn's children
    Paired { call_index: usize, tool_name: String },
    Orphaned,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultEntry {
    pub origin: Origin,
    pub id: String,
    pub content: String,
    pub is_error: bool,
    pub pairing: Pairing,
}

impl ToolResultEntry {
    pub fn is_orphaned(&self) -> bool {
        self.pairing == Pairing::Orphaned
    }

    pub fn tool_name(&self) -> Option<&str> {
        match &self.pairing {
            Pairing::Paired { tool_name, .. } => Some(tool_name),
            Pairing::Orphaned => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    Thinking(TextEntry),
    ToolCall(ToolCallEntry),
    ToolResult(ToolResultEntry),
    System(SystemEntry),
}

impl Child {
    pub fn origin(&self) -> Origin {
        match self {
            Child::Thinking(entry) => entry.origin,
            Child::ToolCall(entry) => entry.origin,
            Child::ToolResult(entry) => entry.origin,
            Child::System(entry) => entry.origin,
        }
    }
}

/// An assistant message and everything it produced until the next message
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub origin: Origin,
    pub id: Option<String>,
    pub content: String,
    pub model: Option<String>,
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    User(TextEntry),
    Turn(Turn),
    System(SystemEntry),
    /// A child record that arrived while no turn was open
    Detached(Child),
}

impl Node {
    pub fn origin(&self) -> Origin {
        match self {
            Node::User(entry) => entry.origin,
            Node::Turn(turn) => turn.origin,
            Node::System(entry) => entry.origin,
            Node::Detached(child) => child.origin(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentModel {
    nodes: Vec<Node>,
}

impl DocumentModel {
    pub(crate) fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Origins of every node and child, depth-first
    pub fn flatten(&self) -> Vec<Origin> {
        let mut out = Vec::new();
        for node in &self.nodes {
            out.push(node.origin());
            if let Node::Turn(turn) = node {
                out.extend(turn.children.iter().map(Child::origin));
            }
        }
        out
    }
}

/// Non-fatal irregularity found while building a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    Decode { line: usize, reason: String },
    OrphanedResult { line: usize, id: String },
    UnterminatedTurn { line: usize, pending_calls: Vec<String> },
}

impl Anomaly {
    pub fn line(&self) -> usize {
        match self {
            Anomaly::Decode { line, .. }
            | Anomaly::OrphanedResult { line, .. }
            | Anomaly::UnterminatedTurn { line, .. } => *line,
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::Decode { line, reason } => write!(f, "line {line}: {reason}"),
            Anomaly::OrphanedResult { line, id } => {
                write!(f, "line {line}: tool result '{id}' has no matching tool call in its turn")
            }
            Anomaly::UnterminatedTurn { line, pending_calls } => write!(
                f,
                "line {line}: log ends inside an assistant turn (awaiting results for {})",
                pending_calls.join(", ")
            ),
        }
    }
}
