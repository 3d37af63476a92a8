//! Browser state machine.
//!
//! [`BrowserState`] owns everything the browser shows: the session list, the filter,
//! the selection, the preview pane and the status line. It is mutated only from the
//! input loop. Work it cannot do itself (reading a preview, writing an export) is
//! returned as an [`Effect`] for the caller to carry out; the outcome comes back
//! through [`BrowserState::apply_preview`] or [`BrowserState::finish_export`].
//!
//! Sessions are listed under a header row per project, in the order projects first
//! appear in the (newest first) session list. A collapsed project keeps its header
//! and hides its sessions. The selection can rest on a header; nothing is previewed
//! or exported from there.
//!
//! # Modes
//!
//! - `Browsing`: the list has focus and the preview follows the selection
//! - `Filtering`: keystrokes edit the filter; the preview follows the first match
//! - `ExportPending`: an export is running; navigation and quitting are ignored
//! - `Exiting`: terminal

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{ExportError, PreviewError};
use crate::export::ExportReport;
use crate::models::SessionSummary;
use crate::preview::Preview;

use super::events::Action;
use super::matcher::SessionMatcher;

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;

/// Limit on filter length
const MAX_QUERY_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Filtering,
    ExportPending,
    Exiting,
}

/// Which pane navigation keys act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Preview,
}

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Option<Instant>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PreviewPane {
    Empty,
    Loading,
    Ready(Preview),
    Failed(String),
}

/// One line of the session list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Project header; `sessions` counts the project's sessions passing the filter
    Header { project: String, sessions: usize, collapsed: bool },
    /// Index into the full session list
    Session(usize),
}

/// Work requested by a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Preview this log, superseding any preview in flight
    Preview(PathBuf),
    /// Drop the preview in flight without starting another
    CancelPreview,
    /// Export this log
    Export(PathBuf),
}

pub struct BrowserState {
    sessions: Vec<SessionSummary>,
    haystacks: Vec<String>,
    matcher: Box<dyn SessionMatcher>,
    /// Indices into `sessions` passing the filter, in list order
    filtered: Vec<usize>,
    rows: Vec<Row>,
    collapsed: HashSet<String>,
    /// Index into `rows`
    selected_idx: usize,
    query: String,
    mode: Mode,
    focus: Focus,
    show_help: bool,
    preview: PreviewPane,
    /// Log the preview pane is showing or waiting for
    previewing: Option<PathBuf>,
    preview_scroll: u16,
    page_size: usize,
    status_message: Option<StatusMessage>,
    needs_redraw: bool,
}

impl BrowserState {
    pub fn new(sessions: Vec<SessionSummary>, matcher: Box<dyn SessionMatcher>) -> Self {
        let haystacks = sessions.iter().map(SessionSummary::haystack).collect();
        let filtered = (0..sessions.len()).collect();
        let mut state = Self {
            sessions,
            haystacks,
            matcher,
            filtered,
            rows: Vec::new(),
            collapsed: HashSet::new(),
            selected_idx: 0,
            query: String::new(),
            mode: Mode::Browsing,
            focus: Focus::List,
            show_help: false,
            preview: PreviewPane::Empty,
            previewing: None,
            preview_scroll: 0,
            page_size: 10,
            status_message: None,
            needs_redraw: true,
        };
        state.rebuild_rows();
        state.selected_idx = state.first_session_row();
        state
    }

    /// Preview for the initial selection
    pub fn start(&mut self) -> Effect {
        self.sync_preview()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Selected row, an index into [`Self::rows`]
    pub fn selected_idx(&self) -> usize {
        self.selected_idx
    }

    pub fn total(&self) -> usize {
        self.sessions.len()
    }

    /// Number of sessions passing the current filter, collapsed ones included
    pub fn visible_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn session(&self, idx: usize) -> Option<&SessionSummary> {
        self.sessions.get(idx)
    }

    /// The selected session; `None` on a project header or an empty list
    pub fn selected(&self) -> Option<&SessionSummary> {
        match self.rows.get(self.selected_idx) {
            Some(Row::Session(idx)) => self.sessions.get(*idx),
            _ => None,
        }
    }

    pub fn preview(&self) -> &PreviewPane {
        &self.preview
    }

    pub fn preview_scroll(&self) -> u16 {
        self.preview_scroll
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status_message.as_ref()
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn mark_drawn(&mut self) {
        self.needs_redraw = false;
    }

    /// Rows one page of list navigation moves
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    pub fn handle_action(&mut self, action: Action) -> Effect {
        match action {
            Action::None => return Effect::None,
            Action::Resize => {
                self.needs_redraw = true;
                return Effect::None;
            }
            _ => {}
        }

        if self.mode == Mode::ExportPending {
            return Effect::None;
        }
        if self.show_help {
            // Any key closes help; quitting still quits
            self.show_help = false;
            self.needs_redraw = true;
            if action != Action::Quit {
                return Effect::None;
            }
        }

        let page = self.page_size as isize;
        match action {
            Action::Quit => {
                self.mode = Mode::Exiting;
                Effect::None
            }
            Action::Back => {
                if self.focus == Focus::Preview {
                    self.focus = Focus::List;
                    self.needs_redraw = true;
                } else {
                    self.mode = Mode::Exiting;
                }
                Effect::None
            }
            Action::MoveUp => self.navigate(-1),
            Action::MoveDown => self.navigate(1),
            Action::PageUp => self.navigate(-page),
            Action::PageDown => self.navigate(page),
            Action::Home => self.navigate(isize::MIN / 2),
            Action::End => self.navigate(isize::MAX / 2),
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::List => Focus::Preview,
                    Focus::Preview => Focus::List,
                };
                self.needs_redraw = true;
                Effect::None
            }
            Action::ToggleHelp => {
                self.show_help = true;
                self.needs_redraw = true;
                Effect::None
            }
            Action::Collapse if self.focus == Focus::List => self.set_collapsed(true),
            Action::Expand if self.focus == Focus::List => self.set_collapsed(false),
            Action::Collapse | Action::Expand => Effect::None,
            Action::StartFilter => {
                self.mode = Mode::Filtering;
                self.focus = Focus::List;
                self.needs_redraw = true;
                Effect::None
            }
            Action::AcceptFilter => {
                self.mode = Mode::Browsing;
                self.needs_redraw = true;
                Effect::None
            }
            Action::CancelFilter => {
                self.mode = Mode::Browsing;
                self.needs_redraw = true;
                if self.query.is_empty() {
                    return Effect::None;
                }
                self.query.clear();
                self.refilter()
            }
            Action::UpdateFilter(c) => {
                if self.query.chars().count() >= MAX_QUERY_CHARS {
                    return Effect::None;
                }
                self.query.push(c);
                self.refilter()
            }
            Action::DeleteChar => {
                if self.query.pop().is_none() {
                    return Effect::None;
                }
                self.refilter()
            }
            Action::Confirm => self.confirm(),
            Action::Resize | Action::None => Effect::None,
        }
    }

    /// Delivers a preview outcome; ignored unless it is for the log being previewed
    pub fn apply_preview(&mut self, path: &Path, outcome: Result<Preview, PreviewError>) {
        if self.previewing.as_deref() != Some(path) {
            return;
        }
        self.preview = match outcome {
            Ok(preview) => PreviewPane::Ready(preview),
            Err(e) => PreviewPane::Failed(e.to_string()),
        };
        self.needs_redraw = true;
    }

    /// Leaves `ExportPending` with the export's outcome on the status line
    pub fn finish_export(&mut self, outcome: Result<ExportReport, ExportError>) {
        if self.mode != Mode::ExportPending {
            return;
        }
        self.mode = Mode::Browsing;
        match outcome {
            Ok(report) => {
                let mut text = format!(
                    "✓ Exported {} messages to {}",
                    report.messages,
                    report.output.display()
                );
                if !report.anomalies.is_empty() {
                    text.push_str(&format!(" ({} warnings)", report.anomalies.len()));
                }
                self.set_status(text, MessageType::Success, Some(STATUS_SUCCESS_DURATION_MS));
            }
            Err(e) => {
                self.set_status(
                    format!("✗ Export failed: {e}"),
                    MessageType::Error,
                    Some(STATUS_ERROR_DURATION_MS),
                );
            }
        }
    }

    /// Set a status message; `None` keeps it until replaced
    pub fn set_status(
        &mut self,
        text: impl Into<String>,
        message_type: MessageType,
        duration_ms: Option<u64>,
    ) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: duration_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
        });
        self.needs_redraw = true;
    }

    /// Check and clear expired status messages
    pub fn check_and_clear_expired_status(&mut self) {
        let expired = self
            .status_message
            .as_ref()
            .and_then(|msg| msg.expires_at)
            .is_some_and(|expires_at| Instant::now() >= expires_at);
        if expired {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    fn navigate(&mut self, delta: isize) -> Effect {
        if self.focus == Focus::Preview && self.mode == Mode::Browsing {
            self.scroll_preview(delta);
            return Effect::None;
        }
        self.move_selection(delta)
    }

    fn scroll_preview(&mut self, delta: isize) {
        let target =
            (self.preview_scroll as isize).saturating_add(delta).clamp(0, u16::MAX as isize);
        let target = target as u16;
        if target != self.preview_scroll {
            self.preview_scroll = target;
            self.needs_redraw = true;
        }
    }

    fn move_selection(&mut self, delta: isize) -> Effect {
        let total = self.rows.len();
        if total == 0 {
            self.selected_idx = 0;
            return Effect::None;
        }

        let old_idx = self.selected_idx;
        let new_idx = (self.selected_idx as isize).saturating_add(delta).max(0) as usize;
        self.selected_idx = new_idx.min(total - 1);

        if old_idx == self.selected_idx {
            return Effect::None;
        }
        self.needs_redraw = true;
        self.sync_preview()
    }

    /// Re-derives the filtered view and re-anchors on the first match
    fn refilter(&mut self) -> Effect {
        self.filtered = self.matcher.filter(&self.query, &self.haystacks);
        self.rebuild_rows();
        self.selected_idx = self.first_session_row();
        self.needs_redraw = true;
        self.sync_preview()
    }

    /// Groups the filtered sessions into header and session rows
    fn rebuild_rows(&mut self) {
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        for &idx in &self.filtered {
            let project = self.sessions[idx].project.as_str();
            match groups.iter_mut().find(|(name, _)| *name == project) {
                Some((_, members)) => members.push(idx),
                None => groups.push((project, vec![idx])),
            }
        }

        let mut rows = Vec::with_capacity(groups.len() + self.filtered.len());
        for (project, members) in groups {
            let collapsed = self.collapsed.contains(project);
            rows.push(Row::Header {
                project: project.to_string(),
                sessions: members.len(),
                collapsed,
            });
            if !collapsed {
                rows.extend(members.into_iter().map(Row::Session));
            }
        }
        self.rows = rows;
    }

    /// First session row, or the first header when every match is collapsed
    fn first_session_row(&self) -> usize {
        self.rows.iter().position(|row| matches!(row, Row::Session(_))).unwrap_or(0)
    }

    /// Project of the selected row, header or session
    fn selected_project(&self) -> Option<String> {
        match self.rows.get(self.selected_idx)? {
            Row::Header { project, .. } => Some(project.clone()),
            Row::Session(idx) => self.sessions.get(*idx).map(|s| s.project.clone()),
        }
    }

    /// Collapses or expands the selected row's project; the selection moves to its header
    fn set_collapsed(&mut self, collapse: bool) -> Effect {
        let Some(project) = self.selected_project() else {
            return Effect::None;
        };
        let changed = if collapse {
            self.collapsed.insert(project.clone())
        } else {
            self.collapsed.remove(&project)
        };
        if !changed {
            return Effect::None;
        }

        self.rebuild_rows();
        self.selected_idx = self
            .rows
            .iter()
            .position(|row| matches!(row, Row::Header { project: p, .. } if *p == project))
            .unwrap_or(0);
        self.needs_redraw = true;
        self.sync_preview()
    }

    /// Points the preview pane at the selection, requesting work only on change
    fn sync_preview(&mut self) -> Effect {
        let target = self.selected().map(|s| s.path.clone());
        if target == self.previewing {
            return Effect::None;
        }
        self.preview_scroll = 0;
        self.needs_redraw = true;
        match target {
            Some(path) => {
                self.previewing = Some(path.clone());
                self.preview = PreviewPane::Loading;
                Effect::Preview(path)
            }
            None => {
                self.previewing = None;
                self.preview = PreviewPane::Empty;
                Effect::CancelPreview
            }
        }
    }

    /// Exports the selected session; on a project header, toggles the group instead
    fn confirm(&mut self) -> Effect {
        if let Some(Row::Header { collapsed, .. }) = self.rows.get(self.selected_idx) {
            let collapse = !*collapsed;
            return self.set_collapsed(collapse);
        }
        let Some(session) = self.selected() else {
            self.set_status(
                "✗ No session selected",
                MessageType::Error,
                Some(STATUS_ERROR_DURATION_MS),
            );
            return Effect::None;
        };
        let path = session.path.clone();
        let label = if session.title.is_empty() {
            session.session_id.clone()
        } else {
            session.title.clone()
        };
        self.mode = Mode::ExportPending;
        self.set_status(format!("Exporting {label}…"), MessageType::Info, None);
        Effect::Export(path)
    }
}
