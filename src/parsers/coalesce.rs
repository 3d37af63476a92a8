//! Merging of streamed assistant messages.
//!
//! Claude Code writes one content block per line while a response streams, each
//! line repeating the assistant message id. The [`Coalescer`] folds consecutive
//! assistant records sharing a non-empty id into one record followed by their
//! thinking and tool call children, so the builder sees a single turn.
//!
//! A child is dropped only when it names the merged message as its parent and
//! repeats a tool call id or thinking text already sent on an earlier line of that
//! message. Everything else passes through in input order.

use std::collections::{HashSet, VecDeque};

use crate::models::{EventKind, EventRecord};

use super::DecodeResult;

struct PendingTurn {
    head: EventRecord,
    children: Vec<EventRecord>,
    /// Tool call ids and thinking text from lines before the latest repeated head
    earlier: ChunkKeys,
    /// Same, for records since the latest head
    current: ChunkKeys,
}

#[derive(Default)]
struct ChunkKeys {
    call_ids: HashSet<String>,
    thoughts: HashSet<String>,
}

impl ChunkKeys {
    fn contains(&self, record: &EventRecord) -> bool {
        match (&record.kind, &record.id) {
            (EventKind::ToolCall { .. }, Some(id)) => self.call_ids.contains(id),
            (EventKind::ThinkingBlock, _) => self.thoughts.contains(&record.content),
            _ => false,
        }
    }

    fn insert(&mut self, record: &EventRecord) {
        match (&record.kind, &record.id) {
            (EventKind::ToolCall { .. }, Some(id)) => {
                self.call_ids.insert(id.clone());
            }
            (EventKind::ThinkingBlock, _) => {
                self.thoughts.insert(record.content.clone());
            }
            _ => {}
        }
    }

    fn absorb(&mut self, other: ChunkKeys) {
        self.call_ids.extend(other.call_ids);
        self.thoughts.extend(other.thoughts);
    }
}

impl PendingTurn {
    fn new(head: EventRecord) -> Self {
        Self {
            head,
            children: Vec::new(),
            earlier: ChunkKeys::default(),
            current: ChunkKeys::default(),
        }
    }

    fn merge_head(&mut self, next: EventRecord) {
        let finished = std::mem::take(&mut self.current);
        self.earlier.absorb(finished);

        if !next.content.trim().is_empty() {
            self.head.content = next.content;
        }
        if let EventKind::AssistantMessage { model: Some(model) } = next.kind
            && let EventKind::AssistantMessage { model: current } = &mut self.head.kind
            && current.is_none()
        {
            *current = Some(model);
        }
        if self.head.timestamp.is_none() {
            self.head.timestamp = next.timestamp;
        }
    }

    /// Keeps every child except a block re-sent by a later line of the same streamed message
    fn push_child(&mut self, child: EventRecord) {
        if self.is_streamed_repeat(&child) {
            return;
        }
        self.current.insert(&child);
        self.children.push(child);
    }

    fn is_streamed_repeat(&self, child: &EventRecord) -> bool {
        let names_head = matches!(
            (&self.head.id, &child.parent_id),
            (Some(head), Some(parent)) if !head.is_empty() && head == parent
        );
        names_head && self.earlier.contains(child)
    }

    fn shares_id_with(&self, record: &EventRecord) -> bool {
        matches!(
            (&self.head.id, &record.id),
            (Some(a), Some(b)) if !a.is_empty() && a == b
        )
    }
}

/// Push-based coalescing stage between the decoder and the builder
#[derive(Default)]
pub struct Coalescer {
    pending: Option<PendingTurn>,
    ready: VecDeque<DecodeResult>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: DecodeResult) {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                self.ready.push_back(Err(err));
                return;
            }
        };

        match &record.kind {
            EventKind::AssistantMessage { .. } => {
                if let Some(pending) = &mut self.pending
                    && pending.shares_id_with(&record)
                {
                    pending.merge_head(record);
                    return;
                }
                self.flush();
                self.pending = Some(PendingTurn::new(record));
            }
            EventKind::ThinkingBlock | EventKind::ToolCall { .. } => match &mut self.pending {
                Some(pending) => pending.push_child(record),
                None => self.ready.push_back(Ok(record)),
            },
            _ => {
                self.flush();
                self.ready.push_back(Ok(record));
            }
        }
    }

    /// Releases the buffered turn, if any
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.ready.push_back(Ok(pending.head));
            self.ready.extend(pending.children.into_iter().map(Ok));
        }
    }

    /// Results that can no longer change
    pub fn drain(&mut self) -> impl Iterator<Item = DecodeResult> + '_ {
        self.ready.drain(..)
    }
}

/// Iterator adapter over [`Coalescer`]
pub struct Coalesce<I> {
    inner: I,
    coalescer: Coalescer,
    done: bool,
}

impl<I: Iterator<Item = DecodeResult>> Iterator for Coalesce<I> {
    type Item = DecodeResult;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(result) = self.coalescer.ready.pop_front() {
                return Some(result);
            }
            if self.done {
                return None;
            }
            match self.inner.next() {
                Some(result) => self.coalescer.push(result),
                None => {
                    self.coalescer.flush();
                    self.done = true;
                }
            }
        }
    }
}

pub fn coalesce<I>(results: I) -> Coalesce<I::IntoIter>
where
    I: IntoIterator<Item = DecodeResult>,
{
    Coalesce { inner: results.into_iter(), coalescer: Coalescer::new(), done: false }
}
