//! Lyrics pane - current line with context, or the scrollable plain block

use crate::app::state::AppState;
use crate::session::Phase;
use crate::sync::{Selection, select};
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.palette.border))
        .title(" Lyrics ")
        .title_style(Style::default().fg(theme.palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Add horizontal padding
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(1), // Left padding
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Right padding
        ])
        .split(inner)[1];

    if matches!(state.session.phase(), Phase::Idle) {
        render_centered_notice(frame, padded, "No song playing");
        return;
    }

    if state.lyrics_loading && state.session.track().is_empty() {
        render_centered_notice(frame, padded, "Loading lyrics...");
        return;
    }

    let estimate = state.session.current_estimate_ms();
    match select(state.session.track(), estimate) {
        Selection::Empty => render_centered_notice(frame, padded, "No lyrics available"),
        Selection::NotStarted => render_centered_notice(frame, padded, "..."),
        Selection::Synced {
            prev,
            current,
            next,
            ..
        } => {
            if state.compact {
                render_synced(frame, padded, &[], current, &[]);
            } else {
                let before: Vec<&str> = prev.iter().map(|l| l.text.as_str()).collect();
                let after: Vec<&str> = next.iter().map(|l| l.text.as_str()).collect();
                render_synced(frame, padded, &before, current, &after);
            }
        }
        Selection::Block(lines) => render_block(frame, state, padded, lines),
    }
}

fn render_centered_notice(frame: &mut Frame, area: Rect, text: &str) {
    let theme = get_theme();
    let top_padding = (area.height as usize).saturating_sub(1) / 2;
    let mut lines: Vec<Line> = vec![Line::default(); top_padding];
    lines.push(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(theme.palette.fg_secondary),
    )));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_synced(
    frame: &mut Frame,
    area: Rect,
    before: &[&str],
    current: &crate::lyrics::LyricLine,
    after: &[&str],
) {
    let theme = get_theme();
    let max_width = area.width.saturating_sub(4) as usize;

    let mut display_lines: Vec<Line> = Vec::new();
    for text in before {
        display_lines.push(Line::from(Span::styled(
            truncate_str(text, max_width),
            Style::default().fg(theme.palette.fg_secondary),
        )));
    }
    display_lines.push(Line::from(vec![
        Span::styled(
            "♪ ",
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            truncate_str(&current.text, max_width),
            Style::default()
                .fg(theme.palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    for text in after {
        display_lines.push(Line::from(Span::styled(
            truncate_str(text, max_width),
            Style::default().fg(theme.palette.fg_secondary),
        )));
    }

    // Center vertically
    let available_height = area.height as usize;
    let content_height = display_lines.len();
    let top_padding = available_height.saturating_sub(content_height) / 2;

    let mut centered_lines: Vec<Line> = vec![Line::default(); top_padding];
    centered_lines.extend(display_lines);

    frame.render_widget(
        Paragraph::new(centered_lines).alignment(Alignment::Center),
        area,
    );
}

/// Plain lyrics have no timing, so the whole text is shown as a block the
/// operator scrolls by hand.
fn render_block(frame: &mut Frame, state: &AppState, area: Rect, lines: &[crate::lyrics::LyricLine]) {
    let theme = get_theme();
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_height = area.height as usize;

    let display_lines: Vec<Line> = lines
        .iter()
        .skip(state.plain_scroll)
        .take(visible_height)
        .map(|l| {
            Line::from(Span::styled(
                truncate_str(&l.text, max_width),
                Style::default().fg(theme.palette.fg_primary),
            ))
        })
        .collect();

    frame.render_widget(Paragraph::new(display_lines), area);

    // Scroll position indicator
    if lines.len() > visible_height {
        let pos_text = format!("{}/{}", state.plain_scroll + 1, lines.len());
        let pos_len = pos_text.len() as u16;
        let pos_x = area.x + area.width.saturating_sub(pos_len);
        if pos_x > area.x {
            frame.render_widget(
                Paragraph::new(pos_text).style(Style::default().fg(theme.palette.fg_secondary)),
                Rect::new(pos_x, area.y, pos_len, 1),
            );
        }
    }
}
