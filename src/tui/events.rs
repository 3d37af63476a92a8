use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::state::Mode;

/// User actions from keyboard and terminal events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    /// Leave the preview pane, or quit from the list
    Back,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Home,
    End,
    ToggleFocus,
    ToggleHelp,
    Collapse,
    Expand,
    StartFilter,
    /// Leave the filter box keeping the query
    AcceptFilter,
    CancelFilter,
    UpdateFilter(char),
    DeleteChar,
    Confirm,
    Resize,
    None,
}

/// Poll for terminal events and convert to actions
pub fn poll_event(timeout: Duration, mode: Mode) -> anyhow::Result<Action> {
    if event::poll(timeout)? {
        return Ok(match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => key_to_action(key, mode),
            Event::Resize(_, _) => Action::Resize,
            _ => Action::None,
        });
    }
    Ok(Action::None)
}

pub fn key_to_action(key: KeyEvent, mode: Mode) -> Action {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return Action::Quit;
    }
    match mode {
        Mode::Filtering => filter_key_to_action(key),
        _ => browse_key_to_action(key),
    }
}

fn browse_key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => Action::Back,

        // Navigation (Vim style)
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::Char('p'), KeyModifiers::CONTROL) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::Home,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::End,

        // Project groups
        (KeyCode::Char('h'), KeyModifiers::NONE) | (KeyCode::Left, _) => Action::Collapse,
        (KeyCode::Char('l'), KeyModifiers::NONE) | (KeyCode::Right, _) => Action::Expand,

        // Actions
        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Char('/'), KeyModifiers::NONE) => Action::StartFilter,
        (KeyCode::Char('?'), _) => Action::ToggleHelp,
        (KeyCode::Tab, _) => Action::ToggleFocus,

        _ => Action::None,
    }
}

fn filter_key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => Action::CancelFilter,
        (KeyCode::Tab, _) => Action::AcceptFilter,
        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Backspace, _) => Action::DeleteChar,
        (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        // Filter input
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::UpdateFilter(c)
        }

        _ => Action::None,
    }
}
