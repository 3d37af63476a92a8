//! Interactive session browser
//!
//! A split-pane terminal UI: session list on the left, a live preview of the
//! selection on the right. [`state::BrowserState`] is the state machine;
//! [`App`] runs it against a terminal and the background preview/export work.

mod app;
mod events;
mod layout;
pub mod matcher;
mod rendering;
pub mod state;
mod terminal;
mod timestamps;

use anyhow::Result;
pub use app::{App, BrowserOptions};
pub use matcher::{FuzzyMatcher, MatchPolicy, SessionMatcher, SubstringMatcher};
pub use state::{BrowserState, Mode};
use terminal::TerminalManager;

use crate::models::SessionSummary;

/// Run the browser until the user quits
pub fn run_browser(sessions: Vec<SessionSummary>, options: BrowserOptions) -> Result<()> {
    let mut manager = TerminalManager::new()?;
    let mut app = App::new(sessions, options);

    let res = app.run(manager.terminal_mut());

    // Stop the preview worker before handing the screen back
    drop(app);
    manager.restore()?;
    res
}
