// Help bar: key hints and where to find per-gameweek history.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const KEY_HINTS: &str = " Tab:Switch picker | Type:Search | Up/Down:Move | Enter:Pick | Esc:Clear (empty: Quit) | Ctrl+C:Quit";
const HISTORY_TIP: &str = " | Tip: per-gameweek history via element-summary/{element_id}";

pub fn render(frame: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(KEY_HINTS, Style::default().fg(Color::White)),
        Span::styled(
            HISTORY_TIP,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ),
    ]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tip_points_at_element_summary() {
        assert!(HISTORY_TIP.contains("element-summary/{element_id}"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(100, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, frame.area())).unwrap();
    }
}
