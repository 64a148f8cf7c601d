// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// | Message (1 row): error or loading notice          |
// +-------------------------+------------------------+
// | Picker 1 (9 rows)        | Picker 2               |
// +-------------------------+------------------------+
// | Card 1 (fill)            | Card 2                 |
// +-------------------------+------------------------+
// | Comparison (3 rows)                               |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Title and refresh notice.
    pub status_bar: Rect,
    pub message: Rect,
    /// Search pickers, one per slot.
    pub pickers: [Rect; 2],
    /// Player cards in slot order.
    pub cards: [Rect; 2],
    pub comparison: Rect,
    /// Key hints and the history tip.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // message
            Constraint::Length(9), // pickers
            Constraint::Min(9),    // cards
            Constraint::Length(3), // comparison
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let pickers = split_pair(vertical[2]);
    let cards = split_pair(vertical[3]);

    AppLayout {
        status_bar: vertical[0],
        message: vertical[1],
        pickers,
        cards,
        comparison: vertical[4],
        help_bar: vertical[5],
    }
}

fn split_pair(area: Rect) -> [Rect; 2] {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    [halves[0], halves[1]]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
