// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (focus, query text,
// highlighted result).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (a pick or Quit). Returns `None` when the key press was
/// handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits regardless of query state
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    match key_event.code {
        KeyCode::Tab | KeyCode::BackTab => {
            view_state.focus = view_state.focus.other();
            view_state.highlighted = 0;
            None
        }
        // Esc clears the query first; on an empty query it quits.
        KeyCode::Esc => {
            if view_state.query(view_state.focus).is_empty() {
                return Some(UserCommand::Quit);
            }
            focused_query(view_state).clear();
            view_state.highlighted = 0;
            None
        }
        KeyCode::Up => {
            view_state.highlighted = view_state.highlighted.saturating_sub(1);
            None
        }
        KeyCode::Down => {
            let len = view_state.search_results(view_state.focus).len();
            if view_state.highlighted + 1 < len {
                view_state.highlighted += 1;
            }
            None
        }
        KeyCode::Enter => pick_highlighted(view_state),
        KeyCode::Backspace => {
            focused_query(view_state).pop();
            view_state.highlighted = 0;
            None
        }
        KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            focused_query(view_state).push(c);
            view_state.highlighted = 0;
            None
        }
        _ => None,
    }
}

fn focused_query(view_state: &mut ViewState) -> &mut String {
    &mut view_state.queries[view_state.focus.index()]
}

/// Select the highlighted result into the focused slot and clear the query.
fn pick_highlighted(view_state: &mut ViewState) -> Option<UserCommand> {
    let slot = view_state.focus;
    let element_id = view_state
        .search_results(slot)
        .get(view_state.highlighted)
        .map(|el| el.id)?;
    focused_query(view_state).clear();
    view_state.highlighted = 0;
    Some(UserCommand::Select { slot, element_id })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
