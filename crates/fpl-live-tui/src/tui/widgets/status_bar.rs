// Status bar widget: dashboard title and auto-refresh notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use fpl_live_core::derive::DisplayRecord;

use crate::poller::PollState;
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [title] | [refresh notice]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (dot, dot_color) = poll_indicator(state.poll_state);
    let spans = vec![
        Span::styled(format!(" {dot} "), Style::default().fg(dot_color)),
        Span::styled(
            title(&state.records),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::Gray)),
        Span::styled(
            refresh_notice(state.poll_state, state.poll_interval_secs),
            Style::default().fg(Color::Gray),
        ),
    ];

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// `FPL Live: <first> vs <second>` once both cards resolve.
pub fn title(records: &[DisplayRecord]) -> String {
    match records {
        [first, second] => format!("FPL Live: {} vs {}", first.display, second.display),
        _ => "FPL Live".to_string(),
    }
}

pub fn refresh_notice(poll_state: PollState, interval_secs: u64) -> String {
    match poll_state {
        PollState::Polling(_) => format!("Auto-refresh every {interval_secs}s"),
        PollState::Idle => "Auto-refresh when a gameweek is live".to_string(),
    }
}

pub fn poll_indicator(poll_state: PollState) -> (&'static str, Color) {
    match poll_state {
        PollState::Polling(_) => ("●", Color::Green),
        PollState::Idle => ("●", Color::DarkGray),
    }
}
