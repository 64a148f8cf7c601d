// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the latest `AppSnapshot` plus the
// purely local picker state (focus, query text, highlighted result). The app
// orchestrator pushes `UiUpdate` messages over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{Event, EventStream};
use fpl_live_core::compare::Comparison;
use fpl_live_core::derive::DisplayRecord;
use fpl_live_core::model::{Bootstrap, Element};
use fpl_live_core::search::{search, DEFAULT_SEARCH_LIMIT};
use fpl_live_core::selection::{Selection, Slot};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::poller::PollState;
use crate::protocol::{AppSnapshot, UiUpdate, UserCommand};

use layout::build_layout;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
pub struct ViewState {
    /// True until the first snapshot arrives after a reference load starts.
    pub loading: bool,
    pub bootstrap: Option<Arc<Bootstrap>>,
    pub selection: Selection,
    pub records: Vec<DisplayRecord>,
    pub comparison: Option<Comparison>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    pub poll_state: PollState,
    pub poll_interval_secs: u64,
    pub search_limit: usize,
    /// Picker receiving keyboard input.
    pub focus: Slot,
    /// Query text per picker, indexed by `Slot::index`.
    pub queries: [String; 2],
    /// Highlighted row in the focused picker's results.
    pub highlighted: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            loading: false,
            bootstrap: None,
            selection: [None, None],
            records: Vec::new(),
            comparison: None,
            error: None,
            last_updated: None,
            poll_state: PollState::Idle,
            poll_interval_secs: 30,
            search_limit: DEFAULT_SEARCH_LIMIT,
            focus: Slot::First,
            queries: [String::new(), String::new()],
            highlighted: 0,
        }
    }
}

impl ViewState {
    /// Apply a full state snapshot from the app orchestrator. Picker focus
    /// and query text are local and left unchanged.
    pub fn apply_snapshot(&mut self, snapshot: AppSnapshot) {
        self.loading = false;
        self.bootstrap = snapshot.bootstrap;
        self.selection = snapshot.selection;
        self.records = snapshot.records;
        self.comparison = snapshot.comparison;
        self.error = snapshot.error;
        self.last_updated = snapshot.last_updated;
        self.poll_state = snapshot.poll_state;
        self.poll_interval_secs = snapshot.poll_interval_secs;
        self.search_limit = snapshot.search_limit;

        let len = self.search_results(self.focus).len();
        self.highlighted = self.highlighted.min(len.saturating_sub(1));
    }

    pub fn query(&self, slot: Slot) -> &str {
        &self.queries[slot.index()]
    }

    /// Search results for a picker's current query. Empty until reference
    /// data has loaded.
    pub fn search_results(&self, slot: Slot) -> Vec<&Element> {
        match &self.bootstrap {
            Some(b) => search(&b.elements, self.query(slot), self.search_limit),
            None => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Loading => {
            state.loading = true;
            state.error = None;
        }
        UiUpdate::Snapshot(snapshot) => {
            state.apply_snapshot(*snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete dashboard frame.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::message::render(frame, layout.message, state);
    widgets::picker::render(frame, layout.pickers[0], state, Slot::First);
    widgets::picker::render(frame, layout.pickers[1], state, Slot::Second);
    for (area, record) in layout.cards.iter().zip(&state.records) {
        widgets::card::render(frame, *area, record, state.last_updated);
    }
    widgets::comparison::render(frame, layout.comparison, state);
    widgets::help_bar::render(frame, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Channel closed: app is shutting down
                    None => break Ok(()),
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        match input::handle_key(key_event, &mut view_state) {
                            Some(UserCommand::Quit) => {
                                let _ = cmd_tx.send(UserCommand::Quit).await;
                                break Ok(());
                            }
                            Some(cmd) => {
                                let _ = cmd_tx.send(cmd).await;
                            }
                            None => {}
                        }
                    }
                    // Resize and mouse events are picked up by the next draw.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input error")),
                    None => break Ok(()),
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
