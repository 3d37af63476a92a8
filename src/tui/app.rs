//! Session browser event loop.
//!
//! [`App`] connects a [`BrowserState`] to its background collaborators:
//!
//! - **Previews**: one [`PreviewService`] worker, fronted by a [`PreviewCache`] of
//!   recent results so revisiting a session is instant
//! - **Exports**: each confirmed export runs on its own thread and reports back over
//!   a channel; the loop keeps drawing while it runs
//! - **Dirty state tracking**: redraws only when state changed or every 100ms
//!
//! Background results are applied to the state on the loop's thread only.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tracing::{debug, warn};

use super::events::poll_event;
use super::layout::AppLayout;
use super::matcher::MatchPolicy;
use super::rendering::render_ui;
use super::state::{BrowserState, Effect, Mode};
use crate::error::{ExportError, SinkError};
use crate::export::{ExportOptions, ExportReport, Exporter, FileSource, SessionSource};
use crate::models::SessionSummary;
use crate::preview::{PreviewCache, PreviewOptions, PreviewService, cache};

const TICK: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    pub match_policy: MatchPolicy,
    pub preview: PreviewOptions,
    pub export: ExportOptions,
}

type ExportOutcome = Result<ExportReport, ExportError>;

pub struct App {
    state: BrowserState,
    previews: PreviewService,
    cache: PreviewCache,
    exporter: Exporter,
    export_tx: Sender<ExportOutcome>,
    export_rx: Receiver<ExportOutcome>,
    last_draw_time: Instant,
}

impl App {
    /// Browser reading logs from the filesystem
    pub fn new(sessions: Vec<SessionSummary>, options: BrowserOptions) -> Self {
        let source: Arc<dyn SessionSource> = Arc::new(FileSource);
        let exporter = Exporter::filesystem(options.export.clone());
        Self::with_collaborators(sessions, source, exporter, options)
    }

    pub fn with_collaborators(
        sessions: Vec<SessionSummary>,
        source: Arc<dyn SessionSource>,
        exporter: Exporter,
        options: BrowserOptions,
    ) -> Self {
        let (export_tx, export_rx) = mpsc::channel();
        let mut app = Self {
            state: BrowserState::new(sessions, options.match_policy.matcher()),
            previews: PreviewService::spawn(source, options.preview),
            cache: PreviewCache::new(cache::DEFAULT_CAPACITY),
            exporter,
            export_tx,
            export_rx,
            last_draw_time: Instant::now(),
        };
        let effect = app.state.start();
        app.perform(effect);
        app
    }

    pub fn state(&self) -> &BrowserState {
        &self.state
    }

    /// Run the event loop until the user quits
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.state.mode() != Mode::Exiting {
            self.drain_background();
            self.state.check_and_clear_expired_status();

            // Draw if dirty or if it's been >100ms (for terminal resize handling)
            let now = Instant::now();
            if self.state.needs_redraw() || now.duration_since(self.last_draw_time) >= TICK {
                let mut page_size = 0;
                terminal.draw(|f| {
                    page_size = AppLayout::new(f.area()).list_page_size();
                    render_ui(f, &self.state, chrono::Utc::now());
                })?;
                self.state.set_page_size(page_size);
                self.state.mark_drawn();
                self.last_draw_time = now;
            }

            let action = poll_event(TICK, self.state.mode())?;
            let effect = self.state.handle_action(action);
            self.perform(effect);
        }

        // Nothing in flight is worth finishing once the user has left
        self.previews.cancel();
        Ok(())
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::Preview(path) => {
                if let Some(preview) = self.cache.get(&path).cloned() {
                    self.previews.cancel();
                    self.state.apply_preview(&path, Ok(preview));
                } else {
                    let id = self.previews.request(path.clone());
                    debug!(id, path = %path.display(), "preview requested");
                }
            }
            Effect::CancelPreview => self.previews.cancel(),
            Effect::Export(path) => self.spawn_export(path),
        }
    }

    fn spawn_export(&mut self, path: PathBuf) {
        let destination = self.exporter.destination_for(&path);
        let exporter = self.exporter.clone();
        let tx = self.export_tx.clone();
        let spawned = thread::Builder::new().name("export".to_string()).spawn(move || {
            // Ignore send errors (the browser may have exited)
            let _ = tx.send(exporter.export(&path));
        });
        if let Err(source) = spawned {
            warn!(error = %source, "failed to start export thread");
            self.state.finish_export(Err(SinkError::Io { path: destination, source }.into()));
        }
    }

    /// Applies finished background work to the state
    fn drain_background(&mut self) {
        while let Some(result) = self.previews.try_recv() {
            if let Ok(preview) = &result.outcome {
                self.cache.insert(result.path.clone(), preview.clone());
            }
            self.state.apply_preview(&result.path, result.outcome);
        }
        while let Ok(outcome) = self.export_rx.try_recv() {
            if let Err(e) = &outcome {
                warn!(error = %e, "export failed");
            }
            self.state.finish_export(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::export::{AtomicFileSink, MemorySource};
    use crate::tui::events::Action;
    use crate::tui::state::{MessageType, PreviewPane};

    const LOG: &str = r#"{"kind":"user_message","content":"Summarize the design"}
{"kind":"assistant_message","content":"It has **three** parts"}
"#;

    fn summary(id: &str, title: &str) -> SessionSummary {
        SessionSummary {
            session_id: id.to_string(),
            title: title.to_string(),
            project: "work/app".to_string(),
            path: PathBuf::from(format!("/logs/{id}.jsonl")),
            created: None,
            modified: None,
            git_branch: None,
            message_count: 0,
        }
    }

    fn app(output_dir: &Path) -> App {
        let source = MemorySource::new()
            .with_log("/logs/one.jsonl", LOG)
            .with_log("/logs/two.jsonl", "garbage\n");
        let source: Arc<dyn SessionSource> = Arc::new(source);
        let options = BrowserOptions {
            export: ExportOptions {
                output_dir: Some(output_dir.to_path_buf()),
                ..Default::default()
            },
            ..Default::default()
        };
        let exporter =
            Exporter::new(Arc::clone(&source), Arc::new(AtomicFileSink), options.export.clone());
        App::with_collaborators(
            vec![summary("one", "Design"), summary("two", "Broken"), summary("three", "Missing")],
            source,
            exporter,
            options,
        )
    }

    /// Waits for the current preview and applies it
    fn settle_preview(app: &mut App) {
        let result = app.previews.recv_timeout(Duration::from_secs(5)).expect("preview result");
        if let Ok(preview) = &result.outcome {
            app.cache.insert(result.path.clone(), preview.clone());
        }
        app.state.apply_preview(&result.path, result.outcome);
    }

    fn act(app: &mut App, action: Action) {
        let effect = app.state.handle_action(action);
        app.perform(effect);
    }

    #[test]
    fn test_initial_preview_is_loaded() {
        let dir = TempDir::new().unwrap();
        let mut app = app(dir.path());
        settle_preview(&mut app);

        match app.state().preview() {
            PreviewPane::Ready(preview) => {
                assert_eq!(preview.entries.len(), 2);
                assert_eq!(preview.entries[1].text, "It has three parts");
            }
            other => panic!("expected ready preview, got {other:?}"),
        }
    }

    #[test]
    fn test_preview_failures_render_inline() {
        let dir = TempDir::new().unwrap();
        let mut app = app(dir.path());
        settle_preview(&mut app);

        act(&mut app, Action::MoveDown);
        settle_preview(&mut app);
        assert!(matches!(app.state().preview(), PreviewPane::Failed(_)));

        act(&mut app, Action::MoveDown);
        settle_preview(&mut app);
        match app.state().preview() {
            PreviewPane::Failed(message) => assert!(message.contains("not found")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(app.state().mode(), Mode::Browsing);
    }

    #[test]
    fn test_cached_preview_is_reused() {
        let dir = TempDir::new().unwrap();
        let mut app = app(dir.path());
        settle_preview(&mut app);
        assert_eq!(app.cache.len(), 1);

        act(&mut app, Action::MoveDown);
        act(&mut app, Action::MoveUp);
        // Served from the cache without waiting on the worker
        assert!(matches!(app.state().preview(), PreviewPane::Ready(_)));
    }

    #[test]
    fn test_export_round_trip_through_channel() {
        let dir = TempDir::new().unwrap();
        let mut app = app(dir.path());

        act(&mut app, Action::Confirm);
        assert_eq!(app.state().mode(), Mode::ExportPending);

        let outcome = app.export_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.state.finish_export(outcome);

        assert_eq!(app.state().mode(), Mode::Browsing);
        let status = app.state().status().unwrap();
        assert_eq!(status.message_type, MessageType::Success);
        assert!(dir.path().join("claude-session-one.html").exists());
    }

    #[test]
    fn test_failed_export_keeps_browser_usable() {
        let dir = TempDir::new().unwrap();
        let mut app = app(dir.path());

        act(&mut app, Action::End);
        act(&mut app, Action::Confirm);
        let outcome = app.export_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        app.state.finish_export(outcome);

        assert_eq!(app.state().mode(), Mode::Browsing);
        assert_eq!(app.state().status().unwrap().message_type, MessageType::Error);

        act(&mut app, Action::Home);
        assert_eq!(app.state().selected_idx(), 0);
    }
}
