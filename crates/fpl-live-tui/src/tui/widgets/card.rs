// Player card: team, position and price, season and gameweek totals, photo
// URL, and the time live stats were last refreshed.

use chrono::{DateTime, Local};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use fpl_live_core::derive::DisplayRecord;

/// Render one card into the given area.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    record: &DisplayRecord,
    last_updated: Option<DateTime<Local>>,
) {
    let lines = build_card_lines(record, last_updated);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", record.display),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// `£6.5m`, or `None` when the price is zero.
pub fn cost_label(cost: f64) -> Option<String> {
    (cost != 0.0).then(|| format!("£{cost:.1}m"))
}

/// `Pos: MID • £6.5m`, dropping whichever half is unavailable.
pub fn detail_line(record: &DisplayRecord) -> String {
    let parts: Vec<String> = [
        record.position.as_ref().map(|p| format!("Pos: {p}")),
        cost_label(record.cost),
    ]
    .into_iter()
    .flatten()
    .collect();
    parts.join(" • ")
}

pub fn updated_label(last_updated: DateTime<Local>) -> String {
    format!("Updated: {}", last_updated.format("%H:%M:%S"))
}

fn build_card_lines(
    record: &DisplayRecord,
    last_updated: Option<DateTime<Local>>,
) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", record.team.as_deref().unwrap_or("")),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!(" {}", detail_line(record)),
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(" Season total: ", label),
            Span::styled(record.season_points.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled(" GW live:      ", label),
            Span::styled(record.gameweek_points.to_string(), value),
        ]),
        Line::default(),
        Line::from(Span::styled(
            format!(" Photo: {}", record.photo_url),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    if let Some(ts) = last_updated {
        lines.push(Line::from(Span::styled(
            format!(" {}", updated_label(ts)),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}
