// Messages exchanged between the app orchestrator, its background tasks,
// and the TUI.

use std::sync::Arc;

use chrono::{DateTime, Local};
use fpl_live_core::compare::Comparison;
use fpl_live_core::derive::DisplayRecord;
use fpl_live_core::model::{Bootstrap, LiveStats};
use fpl_live_core::selection::{Selection, Slot};
use fpl_live_core::source::FetchError;

use crate::poller::PollState;

/// Results and timer ticks delivered to the app loop.
#[derive(Debug)]
pub enum AppEvent {
    BootstrapLoaded(Result<Bootstrap, FetchError>),
    LiveLoaded {
        seq: u64,
        event_id: u32,
        result: Result<LiveStats, FetchError>,
    },
    /// Periodic poll for the given gameweek.
    PollTick(u32),
}

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Select { slot: Slot, element_id: u32 },
    Quit,
}

/// Everything the dashboard renders, rebuilt after every state change.
#[derive(Debug, Clone)]
pub struct AppSnapshot {
    pub bootstrap: Option<Arc<Bootstrap>>,
    pub selection: Selection,
    pub records: Vec<DisplayRecord>,
    pub comparison: Option<Comparison>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
    pub poll_state: PollState,
    pub poll_interval_secs: u64,
    pub search_limit: usize,
}

/// Updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Reference data is being fetched.
    Loading,
    Snapshot(Box<AppSnapshot>),
}
