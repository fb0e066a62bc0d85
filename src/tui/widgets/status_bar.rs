//! Status bar - offset, poll countdown, key hints, toasts

use crate::app::state::{AppState, ToastKind};
use crate::lyrics::parser::format_offset;
use crate::tui::theme::get_theme;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::truncate_str;

pub fn render(frame: &mut Frame, state: &AppState, area: Rect) {
    let theme = get_theme();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    // Row 1: status message or active toast.
    let message_line = if let Some(toast) = &state.toast {
        let (prefix, color) = match toast.kind {
            ToastKind::Info => ("✓ ", theme.palette.fg_primary),
            ToastKind::Error => ("✗ ", theme.palette.error),
        };
        Line::from(vec![
            Span::styled(prefix, Style::default().fg(color)),
            Span::styled(
                truncate_str(&toast.message, area.width.saturating_sub(3) as usize),
                Style::default().fg(color),
            ),
        ])
    } else {
        Line::from(Span::styled(
            truncate_str(&state.status, area.width as usize),
            Style::default().fg(theme.palette.fg_secondary),
        ))
    };
    frame.render_widget(Paragraph::new(message_line), rows[0]);

    // Row 2: offset | next poll | key hints.
    let offset = state.session.manual_offset_ms();
    let poll = if state.recognizing {
        "listening".to_string()
    } else {
        format!("next poll {}s", state.next_poll_in_secs())
    };

    let mut spans = Vec::new();
    if state.session.current_song().is_some() {
        spans.push(Span::styled(
            format_offset(state.session.current_estimate_ms()),
            Style::default().fg(theme.palette.fg_primary),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!("offset {offset:+} ms"),
        Style::default().fg(theme.palette.fg_secondary),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        poll,
        Style::default().fg(theme.palette.fg_secondary),
    ));
    if area.width > 60 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "q quit  +/- offset  r recognize  c compact",
            Style::default().fg(theme.palette.border),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
}
