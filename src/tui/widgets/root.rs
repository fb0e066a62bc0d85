//! Root layout widget - orchestrates main layout structure

use crate::app::state::AppState;
use crate::session::Phase;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{lyrics_pane, status_bar, truncate_str};

/// Main layout structure:
/// ┌─────────────────────────────────────────┐
/// │  Header (song / listening state)        │
/// ├─────────────────────────────────────────┤
/// │                                         │
/// │               Lyrics                    │
/// │                                         │
/// ├─────────────────────────────────────────┤
/// │  Status (offset, next poll, keys)       │
/// └─────────────────────────────────────────┘
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let root = frame.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(3),    // Lyrics
            Constraint::Length(2), // Status bar
        ])
        .split(root);

    render_header(frame, state, rows[0]);
    lyrics_pane::render(frame, state, rows[1]);
    status_bar::render(frame, state, rows[2]);
}

fn render_header(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.palette.border))
        .title(" ♪ lyrid ")
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let content_width = inner.width.saturating_sub(2) as usize;

    let line = match state.session.phase() {
        Phase::Idle => Line::from(Span::styled(
            if state.recognizing {
                "Listening..."
            } else {
                "Waiting for music"
            },
            Style::default().fg(theme.palette.fg_secondary),
        )),
        Phase::Identified(song) => {
            let mut text = format!("{} — {}", song.artist, song.title);
            if let Some(album) = &song.album {
                text.push_str(&format!("  ({album})"));
            }
            Line::from(vec![
                Span::styled(" ", Style::default()),
                Span::styled(
                    truncate_str(&text, content_width),
                    Style::default()
                        .fg(theme.palette.fg_primary)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        }
    };

    frame.render_widget(Paragraph::new(line), inner);
}
