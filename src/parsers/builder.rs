//! One-pass construction of the [`DocumentModel`].
//!
//! The builder keeps at most one open assistant turn. Tool results are resolved
//! against the calls of that turn only; a result that finds nothing is kept and
//! marked orphaned. Decode failures never reach the tree, they only add anomalies.

use std::collections::{HashMap, HashSet};

use crate::models::{
    Anomaly, Child, DocumentModel, EventKind, EventRecord, Node, Origin, Pairing, SystemEntry,
    TextEntry, ToolCallEntry, ToolResultEntry, Turn,
};

use super::DecodeResult;

/// Finished document plus everything odd found on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub document: DocumentModel,
    pub anomalies: Vec<Anomaly>,
}

struct OpenTurn {
    turn: Turn,
    /// tool call id -> (child index, tool name)
    calls: HashMap<String, (usize, String)>,
}

impl OpenTurn {
    fn new(turn: Turn) -> Self {
        Self { turn, calls: HashMap::new() }
    }

    fn push(&mut self, child: Child) {
        if let Child::ToolCall(call) = &child {
            let index = self.turn.children.len();
            // First call wins if an id repeats within a turn
            self.calls.entry(call.id.clone()).or_insert((index, call.name.clone()));
        }
        self.turn.children.push(child);
    }

    fn resolve(&self, id: &str) -> Pairing {
        match self.calls.get(id) {
            Some((call_index, tool_name)) => {
                Pairing::Paired { call_index: *call_index, tool_name: tool_name.clone() }
            }
            None => Pairing::Orphaned,
        }
    }

    /// Tool calls in this turn with no result yet, in call order
    fn pending_calls(&self) -> Vec<String> {
        let answered: HashSet<usize> = self
            .turn
            .children
            .iter()
            .filter_map(|child| match child {
                Child::ToolResult(ToolResultEntry {
                    pairing: Pairing::Paired { call_index, .. }, ..
                }) => Some(*call_index),
                _ => None,
            })
            .collect();

        self.turn
            .children
            .iter()
            .enumerate()
            .filter_map(|(index, child)| match child {
                Child::ToolCall(call) if !answered.contains(&index) => Some(call.id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[derive(Default)]
pub struct TranscriptBuilder {
    nodes: Vec<Node>,
    open: Option<OpenTurn>,
    anomalies: Vec<Anomaly>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level nodes so far, counting the open turn
    pub fn top_level_len(&self) -> usize {
        self.nodes.len() + usize::from(self.open.is_some())
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn push(&mut self, result: DecodeResult) {
        match result {
            Ok(record) => self.push_record(record),
            Err(err) => self
                .anomalies
                .push(Anomaly::Decode { line: err.line, reason: err.reason.to_string() }),
        }
    }

    fn push_record(&mut self, record: EventRecord) {
        let origin = Origin { line: record.line, timestamp: record.timestamp };
        match record.kind {
            EventKind::UserMessage => {
                self.close_turn();
                self.nodes.push(Node::User(TextEntry { origin, content: record.content }));
            }
            EventKind::AssistantMessage { model } => {
                self.close_turn();
                self.open = Some(OpenTurn::new(Turn {
                    origin,
                    id: record.id,
                    content: record.content,
                    model,
                    children: Vec::new(),
                }));
            }
            EventKind::ThinkingBlock => {
                self.attach(Child::Thinking(TextEntry { origin, content: record.content }));
            }
            EventKind::ToolCall { name, input } => {
                self.attach(Child::ToolCall(ToolCallEntry {
                    origin,
                    id: record.id.unwrap_or_default(),
                    name,
                    input,
                }));
            }
            EventKind::ToolResult { is_error } => {
                let id = record.id.unwrap_or_default();
                let pairing = match &self.open {
                    Some(open) => open.resolve(&id),
                    None => Pairing::Orphaned,
                };
                if pairing == Pairing::Orphaned {
                    self.anomalies
                        .push(Anomaly::OrphanedResult { line: origin.line, id: id.clone() });
                }
                self.attach(Child::ToolResult(ToolResultEntry {
                    origin,
                    id,
                    content: record.content,
                    is_error,
                    pairing,
                }));
            }
            EventKind::SystemNote { subtype } => {
                let entry = SystemEntry { origin, content: record.content, subtype };
                match &mut self.open {
                    Some(open) => open.push(Child::System(entry)),
                    None => self.nodes.push(Node::System(entry)),
                }
            }
        }
    }

    fn attach(&mut self, child: Child) {
        match &mut self.open {
            Some(open) => open.push(child),
            None => self.nodes.push(Node::Detached(child)),
        }
    }

    fn close_turn(&mut self) {
        if let Some(open) = self.open.take() {
            self.nodes.push(Node::Turn(open.turn));
        }
    }

    pub fn finish(mut self) -> BuildOutput {
        if let Some(open) = self.open.take() {
            let pending_calls = open.pending_calls();
            if !pending_calls.is_empty() {
                self.anomalies
                    .push(Anomaly::UnterminatedTurn { line: open.turn.origin.line, pending_calls });
            }
            self.nodes.push(Node::Turn(open.turn));
        }
        BuildOutput { document: DocumentModel::from_nodes(self.nodes), anomalies: self.anomalies }
    }
}

/// Builds a document from already decoded results
pub fn build_transcript<I>(results: I) -> BuildOutput
where
    I: IntoIterator<Item = DecodeResult>,
{
    let mut builder = TranscriptBuilder::new();
    for result in results {
        builder.push(result);
    }
    builder.finish()
}
