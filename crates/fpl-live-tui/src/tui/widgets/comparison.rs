// Quick comparison row: both names with the season-total indicator between
// them. Omitted unless exactly two cards are shown.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use fpl_live_core::compare::Comparison;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let (Some(comparison), [first, second]) = (state.comparison, state.records.as_slice()) else {
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Quick comparison");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(10),
            Constraint::Percentage(45),
        ])
        .split(inner);

    let name = Style::default().add_modifier(Modifier::BOLD);
    frame.render_widget(
        Paragraph::new(first.display.clone())
            .style(name)
            .alignment(Alignment::Center),
        columns[0],
    );
    frame.render_widget(
        Paragraph::new(comparison.symbol())
            .style(Style::default().fg(symbol_color(comparison)).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        columns[1],
    );
    frame.render_widget(
        Paragraph::new(second.display.clone())
            .style(name)
            .alignment(Alignment::Center),
        columns[2],
    );
}

pub fn symbol_color(comparison: Comparison) -> Color {
    match comparison {
        Comparison::Equal => Color::Yellow,
        Comparison::FirstGreater => Color::Green,
        Comparison::FirstLesser => Color::Red,
    }
}
