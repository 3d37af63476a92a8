use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

use super::layout::{AppLayout, MIN_HEIGHT, MIN_WIDTH, centered, fits};
use super::state::{BrowserState, Focus, MessageType, Mode, PreviewPane, Row};
use super::timestamps::format_age;
use crate::preview::{Preview, PreviewRole};
use crate::utils::truncate_with_ellipsis;

const ACCENT: Color = Color::Rgb(16, 185, 129);
const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const BAR_BG: Color = Color::Rgb(24, 24, 27);
const ERROR: Color = Color::Rgb(239, 68, 68);
const WARNING: Color = Color::Rgb(234, 179, 8);

const HELP_LINES: &[&str] = &[
    "Session Browser - Key Bindings",
    "",
    "  j/Down     Next row",
    "  k/Up       Previous row",
    "  PgDn       Page down",
    "  PgUp       Page up",
    "  g/Home     First row",
    "  G/End      Last row",
    "  h/Left     Collapse project",
    "  l/Right    Expand project",
    "  Enter      Export session / toggle project",
    "  Tab        Toggle preview pane focus",
    "  /          Filter sessions",
    "  ?          This help",
    "  q/Esc      Back to list / quit",
    "",
    "  While filtering:",
    "  Enter      Export first match",
    "  Tab        Keep filter, back to list",
    "  Esc        Clear filter",
];

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &BrowserState, now: DateTime<Utc>) {
    let area = frame.area();
    if !fits(area) {
        render_too_small(frame, area);
        return;
    }

    let layout = AppLayout::new(area);
    render_title_bar(frame, layout.title_area, state);
    render_session_list(frame, layout.list_area, state, now);
    render_preview(frame, layout.preview_area, state);
    render_status_bar(frame, layout.status_area, state);

    if state.show_help() {
        render_help(frame, area);
    }
}

fn render_too_small(frame: &mut Frame, area: Rect) {
    let message = format!(
        "Terminal too small ({}x{}). Need {}x{}.",
        area.width, area.height, MIN_WIDTH, MIN_HEIGHT
    );
    let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height));
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, row);
}

fn render_title_bar(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let count = if state.visible_len() < state.total() {
        format!("({}/{} sessions)", state.visible_len(), state.total())
    } else {
        format!("({} sessions)", state.total())
    };
    let right = format!("{count}  ? for help ");
    let title = " Session Browser";
    let padding = usize::from(area.width).saturating_sub(title.len() + right.chars().count());

    let paragraph = Paragraph::new(format!("{title}{}{right}", " ".repeat(padding)))
        .style(Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(paragraph, area);
}

fn render_session_list(frame: &mut Frame, area: Rect, state: &BrowserState, now: DateTime<Utc>) {
    // Borders, a 2-col highlight marker, indent and the age column
    let title_width = usize::from(area.width).saturating_sub(2 + 2 + 2 + 10);

    let items: Vec<ListItem> = state
        .rows()
        .iter()
        .filter_map(|row| match row {
            Row::Header { project, sessions, collapsed } => {
                let marker = if *collapsed { "[+]" } else { "[-]" };
                Some(ListItem::new(Line::from(Span::styled(
                    format!("{marker} {project} ({sessions})"),
                    Style::default().fg(WARNING).add_modifier(Modifier::BOLD),
                ))))
            }
            Row::Session(idx) => {
                let session = state.session(*idx)?;
                let age = format_age(session.last_activity(), now);
                let title =
                    if session.title.is_empty() { &session.session_id } else { &session.title };
                Some(ListItem::new(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("{age:<9} "), Style::default().fg(MUTED)),
                    Span::raw(truncate_with_ellipsis(title, title_width)),
                ])))
            }
        })
        .collect();

    let border = if state.focus() == Focus::List { ACCENT } else { MUTED };
    let title = if state.visible_len() == 0 && state.total() > 0 {
        " Sessions (no matches) "
    } else {
        " Sessions "
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        )
        .highlight_style(Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let selected = (!state.rows().is_empty()).then_some(state.selected_idx());
    let mut list_state = ListState::default().with_selected(selected);
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_preview(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let content = match state.preview() {
        PreviewPane::Empty => {
            Text::from(Span::styled("No session selected", Style::default().fg(MUTED)))
        }
        PreviewPane::Loading => {
            Text::from(Span::styled("Loading preview…", Style::default().fg(MUTED)))
        }
        PreviewPane::Failed(message) => Text::from(vec![
            Line::from(Span::styled(
                "Preview unavailable",
                Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(message.clone()),
        ]),
        PreviewPane::Ready(preview) => preview_text(preview),
    };

    let border = if state.focus() == Focus::Preview { ACCENT } else { MUTED };
    let paragraph = Paragraph::new(content)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Preview "),
        )
        .wrap(Wrap { trim: false })
        .scroll((state.preview_scroll(), 0));

    frame.render_widget(paragraph, area);
}

fn preview_text(preview: &Preview) -> Text<'static> {
    let mut lines: Vec<Line> = preview
        .meta
        .fields()
        .into_iter()
        .map(|(label, value)| {
            Line::from(vec![
                Span::styled(format!("{label}: "), Style::default().fg(MUTED)),
                Span::raw(value),
            ])
        })
        .collect();
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }

    for entry in &preview.entries {
        let color = match entry.role {
            PreviewRole::Human => Color::Cyan,
            PreviewRole::Claude => ACCENT,
            PreviewRole::System => WARNING,
            PreviewRole::Detached => MUTED,
        };
        lines.push(Line::from(Span::styled(
            entry.role.label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.extend(entry.text.lines().map(|line| Line::from(line.to_string())));
        lines.push(Line::from(""));
    }

    if preview.truncated {
        lines.push(Line::from(Span::styled("…", Style::default().fg(MUTED))));
    }
    if preview.anomalies > 0 {
        lines.push(Line::from(Span::styled(
            format!("{} problem(s) reading this part of the log", preview.anomalies),
            Style::default().fg(WARNING),
        )));
    }
    Text::from(lines)
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let base = Style::default().fg(BRIGHT).bg(BAR_BG);

    let (text, style) = if state.mode() == Mode::Filtering {
        (format!(" /:{}_", state.query()), base)
    } else if let Some(status) = state.status() {
        let style = match status.message_type {
            MessageType::Error => base.fg(ERROR).add_modifier(Modifier::BOLD),
            MessageType::Success => base.fg(ACCENT).add_modifier(Modifier::BOLD),
            MessageType::Info => base,
        };
        (format!(" {}", status.text), style)
    } else if state.focus() == Focus::Preview {
        (" Tab/Esc:List  j/k:Scroll preview  ?:Help".to_string(), base)
    } else {
        let mut text =
            " j/k:Navigate  h/l:Fold  /:Filter  Enter:Export  Tab:Preview  q:Quit".to_string();
        if !state.query().is_empty() {
            text.push_str(&format!("  [filter: {}]", state.query()));
        }
        (text, base)
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let width = HELP_LINES.iter().map(|line| line.len()).max().unwrap_or(0) as u16 + 4;
    let height = HELP_LINES.len() as u16 + 2;
    let popup = centered(area, width, height);

    let text: Vec<Line> = HELP_LINES.iter().map(|line| Line::from(*line)).collect();
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .style(Style::default().bg(BAR_BG).fg(BRIGHT)),
    );
    frame.render_widget(Clear, popup);
    frame.render_widget(paragraph, popup);
}
