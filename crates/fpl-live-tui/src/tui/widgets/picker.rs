// Player picker: query input, up to `search_limit` matches, and the id
// currently held by the slot.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use fpl_live_core::model::Element;
use fpl_live_core::selection::Slot;

use crate::tui::ViewState;

/// Render the picker for `slot` into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, slot: Slot) {
    let focused = state.focus == slot;
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let results = state.search_results(slot);
    let highlighted = focused.then_some(state.highlighted);
    // Rows inside the border, minus the input line and the selection line.
    let rows = (area.height as usize).saturating_sub(4);
    let lines = build_picker_lines(
        state.query(slot),
        &results,
        highlighted,
        state.selection[slot.index()],
        rows,
        focused,
    );

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(picker_title(slot)),
    );
    frame.render_widget(paragraph, area);
}

pub fn picker_title(slot: Slot) -> &'static str {
    match slot {
        Slot::First => "Choose first player",
        Slot::Second => "Choose second player",
    }
}

/// `First Second (web_name)`, as listed in the results.
pub fn result_label(element: &Element) -> String {
    format!("{} ({})", element.full_name(), element.web_name)
}

/// First result index to show so `highlighted` stays within `rows`.
pub fn scroll_offset(highlighted: usize, rows: usize) -> usize {
    if rows == 0 {
        return highlighted;
    }
    highlighted.saturating_sub(rows - 1)
}

fn build_picker_lines(
    query: &str,
    results: &[&Element],
    highlighted: Option<usize>,
    selected: Option<u32>,
    rows: usize,
    focused: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let cursor = if focused { "_" } else { "" };
    let input = if query.is_empty() && !focused {
        Span::styled(
            " Search for a player (e.g. Declan Rice)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(format!(" > {query}{cursor}"), Style::default().fg(Color::White))
    };
    lines.push(Line::from(input));

    let offset = scroll_offset(highlighted.unwrap_or(0), rows);
    for (idx, element) in results.iter().enumerate().skip(offset).take(rows) {
        let style = if highlighted == Some(idx) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::from(Span::styled(
            format!("   {}", result_label(element)),
            style,
        )));
    }

    if let Some(id) = selected {
        lines.push(Line::from(Span::styled(
            format!(" Selected: {id}"),
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}
