// Application orchestrator: owns the selection, reference data, and live
// stats, and drives fetches and polling from a single event loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use fpl_live_core::compare::compare;
use fpl_live_core::config::Config;
use fpl_live_core::derive::derive_records;
use fpl_live_core::model::{Bootstrap, LiveStats};
use fpl_live_core::selection::{SelectionStore, Slot};
use fpl_live_core::source::{FetchError, FplSource};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::poller::{LivePoller, PollState, RequestSequencer};
use crate::protocol::{AppEvent, AppSnapshot, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub config: Config,
    pub source: Arc<dyn FplSource>,
    pub selection: SelectionStore,
    pub bootstrap: Option<Arc<Bootstrap>>,
    pub live: Option<LiveStats>,
    /// Local time of the last applied live snapshot.
    pub last_updated: Option<DateTime<Local>>,
    /// Latest user-visible error; a new one replaces the old.
    pub error: Option<String>,
    pub poller: LivePoller,
    /// Sequence numbers for live fetches. Only the latest issued fetch is
    /// applied when it completes.
    pub live_requests: RequestSequencer,
    /// Spawned fetch tasks report back through a clone of this sender.
    pub event_tx: mpsc::Sender<AppEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn FplSource>,
        selection: SelectionStore,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let period = Duration::from_secs(config.dashboard.poll_interval_secs);
        AppState {
            poller: LivePoller::new(period, event_tx.clone()),
            config,
            source,
            selection,
            bootstrap: None,
            live: None,
            last_updated: None,
            error: None,
            live_requests: RequestSequencer::default(),
            event_tx,
        }
    }

    /// Clear the current error and fetch reference data in the background.
    pub fn start_bootstrap_load(&mut self) {
        self.error = None;
        let source = Arc::clone(&self.source);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = source.bootstrap().await;
            let _ = tx.send(AppEvent::BootstrapLoaded(result)).await;
        });
    }

    /// Apply a finished reference load: resolve defaults, fetch live stats
    /// for the initial gameweek, and start polling the current one.
    pub fn handle_bootstrap(&mut self, result: Result<Bootstrap, FetchError>) {
        let bootstrap = match result {
            Ok(b) => b,
            Err(e) => {
                warn!("Bootstrap load failed: {e}");
                self.error = Some(format!("Failed to load bootstrap: {e}"));
                return;
            }
        };

        info!(
            "Loaded {} players, {} teams, {} gameweeks",
            bootstrap.elements.len(),
            bootstrap.teams.len(),
            bootstrap.events.len()
        );

        if let Err(e) = self
            .selection
            .apply_defaults(&bootstrap.elements, &self.config.dashboard.default_players)
        {
            warn!("Failed to persist default selection: {e:#}");
        }

        let initial = bootstrap.initial_event();
        let current = bootstrap.current_event();
        self.bootstrap = Some(Arc::new(bootstrap));

        match initial {
            Some(event_id) => self.spawn_live_fetch(event_id),
            None => info!("Bootstrap lists no gameweeks, skipping live fetch"),
        }
        self.poller.transition(current);
    }

    /// Issue a live fetch for `event_id` under a fresh sequence number.
    pub fn spawn_live_fetch(&mut self, event_id: u32) {
        let seq = self.live_requests.issue();
        debug!("Fetching live stats for gameweek {event_id} (request {seq})");
        let source = Arc::clone(&self.source);
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = source.live(event_id).await;
            let _ = tx
                .send(AppEvent::LiveLoaded {
                    seq,
                    event_id,
                    result,
                })
                .await;
        });
    }

    /// Apply a completed live fetch. Returns `false` when the response was
    /// superseded by a later request and discarded.
    pub fn handle_live(
        &mut self,
        seq: u64,
        event_id: u32,
        result: Result<LiveStats, FetchError>,
    ) -> bool {
        if !self.live_requests.is_current(seq) {
            debug!("Discarding superseded live response for gameweek {event_id} (request {seq})");
            return false;
        }

        match result {
            Ok(stats) => {
                debug!("Live stats for gameweek {event_id}: {} players", stats.len());
                self.live = Some(stats);
                self.last_updated = Some(Local::now());
            }
            Err(e) => {
                warn!("Live load for gameweek {event_id} failed: {e}");
                self.error = Some(format!("Failed to load live data: {e}"));
            }
        }
        true
    }

    /// Periodic tick. Ticks for a gameweek no longer being polled are
    /// ignored.
    pub fn handle_poll_tick(&mut self, event_id: u32) {
        if self.poller.state() == PollState::Polling(event_id) {
            self.spawn_live_fetch(event_id);
        } else {
            debug!("Ignoring poll tick for gameweek {event_id}");
        }
    }

    pub fn select(&mut self, slot: Slot, element_id: u32) {
        info!("Slot {:?} set to player {element_id}", slot);
        if let Err(e) = self.selection.set_slot(slot, element_id) {
            warn!("Failed to persist selection: {e:#}");
        }
    }

    /// Build an `AppSnapshot` from the current application state.
    pub fn build_snapshot(&self) -> AppSnapshot {
        let selection = self.selection.pair();
        let records = self
            .bootstrap
            .as_deref()
            .map(|b| {
                derive_records(
                    b,
                    self.live.as_ref(),
                    &selection,
                    &self.config.dashboard.photo_base_url,
                )
            })
            .unwrap_or_default();
        let comparison = compare(&records);

        AppSnapshot {
            bootstrap: self.bootstrap.clone(),
            selection,
            records,
            comparison,
            error: self.error.clone(),
            last_updated: self.last_updated,
            poll_state: self.poller.state(),
            poll_interval_secs: self.config.dashboard.poll_interval_secs,
            search_limit: self.config.dashboard.search_limit,
        }
    }
}

async fn push_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let snapshot = state.build_snapshot();
    let _ = ui_tx.send(UiUpdate::Snapshot(Box::new(snapshot))).await;
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Kicks off the reference load, then listens on two channels using
/// `tokio::select!`:
/// 1. Fetch results and poll ticks from background tasks
/// 2. User commands from the TUI
///
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut event_rx: mpsc::Receiver<AppEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    state.start_bootstrap_load();
    let _ = ui_tx.send(UiUpdate::Loading).await;

    loop {
        tokio::select! {
            // --- Fetch results and poll ticks ---
            event = event_rx.recv() => {
                match event {
                    Some(AppEvent::BootstrapLoaded(result)) => {
                        state.handle_bootstrap(result);
                        push_snapshot(&state, &ui_tx).await;
                    }
                    Some(AppEvent::LiveLoaded { seq, event_id, result }) => {
                        if state.handle_live(seq, event_id, result) {
                            push_snapshot(&state, &ui_tx).await;
                        }
                    }
                    Some(AppEvent::PollTick(event_id)) => {
                        state.handle_poll_tick(event_id);
                    }
                    None => {
                        info!("Event channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Select { slot, element_id }) => {
                        state.select(slot, element_id);
                        push_snapshot(&state, &ui_tx).await;
                    }
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    state.poller.stop();
    state.live_requests.invalidate();
    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fpl_live_core::compare::Comparison;
    use fpl_live_core::config::parse_config;
    use fpl_live_core::model::{
        Element, ElementStats, ElementType, Event, LiveElement, LivePayload, Team,
    };
    use fpl_live_core::storage::MemoryStorage;

    const CONFIG: &str = r#"
[relay]
bind = "127.0.0.1"
port = 8787
route = "/api/fpl"

[upstream]
base_url = "https://fantasy.premierleague.com/api/"
user_agent = "Mozilla/5.0 FPL-Live-Tracker"
timeout_secs = 10

[dashboard]
relay_url = "http://127.0.0.1:8787"
poll_interval_secs = 30
search_limit = 12
photo_base_url = "https://example.test/photos/"
default_players = ["Declan Rice", "Pape Matar Sarr"]
"#;

    /// Source that is never expected to be called.
    struct UnusedSource;

    #[async_trait]
    impl FplSource for UnusedSource {
        async fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
            Err(FetchError::Status(500))
        }

        async fn live(&self, _event_id: u32) -> Result<LiveStats, FetchError> {
            Err(FetchError::Status(500))
        }
    }

    fn player(id: u32, first: &str, second: &str, web: &str, team: u32, total: i32) -> Element {
        Element {
            id,
            first_name: first.to_string(),
            second_name: second.to_string(),
            web_name: web.to_string(),
            team,
            element_type: 3,
            now_cost: 60,
            total_points: total,
            photo: format!("{id}.jpg"),
        }
    }

    fn bootstrap(events: Vec<Event>) -> Bootstrap {
        Bootstrap {
            elements: vec![
                player(5, "Declan", "Rice", "Rice", 1, 120),
                player(9, "Pape Matar", "Sarr", "Sarr", 18, 88),
            ],
            teams: vec![
                Team { id: 1, name: "Arsenal".into() },
                Team { id: 18, name: "Spurs".into() },
            ],
            element_types: vec![ElementType {
                id: 3,
                singular_name_short: "MID".into(),
            }],
            events,
        }
    }

    fn event(id: u32, is_current: bool) -> Event {
        Event {
            id,
            is_current,
            is_next: false,
        }
    }

    fn live(event_id: u32, points: &[(u32, i32)]) -> LiveStats {
        LiveStats::new(
            event_id,
            LivePayload {
                elements: points
                    .iter()
                    .map(|&(id, total_points)| LiveElement {
                        id,
                        stats: ElementStats {
                            total_points,
                            ..ElementStats::default()
                        },
                    })
                    .collect(),
            },
        )
    }

    fn create_test_app_state() -> (AppState, mpsc::Receiver<AppEvent>) {
        let config = parse_config(CONFIG).unwrap();
        let (event_tx, event_rx) = mpsc::channel(16);
        let selection = SelectionStore::load(Box::new(MemoryStorage::new()));
        let state = AppState::new(config, Arc::new(UnusedSource), selection, event_tx);
        (state, event_rx)
    }

    // -----------------------------------------------------------------------
    // Tests: bootstrap handling
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn bootstrap_failure_sets_error_and_stays_idle() {
        let (mut state, _rx) = create_test_app_state();
        state.handle_bootstrap(Err(FetchError::Status(503)));

        assert_eq!(state.error.as_deref(), Some("Failed to load bootstrap: HTTP 503"));
        assert!(state.bootstrap.is_none());
        assert_eq!(state.poller.state(), PollState::Idle);
    }

    #[tokio::test]
    async fn bootstrap_success_fills_defaults_and_polls_current() {
        let (mut state, _rx) = create_test_app_state();
        state.handle_bootstrap(Ok(bootstrap(vec![event(1, false), event(2, true)])));

        assert_eq!(state.selection.pair(), [Some(5), Some(9)]);
        assert_eq!(state.poller.state(), PollState::Polling(2));
    }

    #[tokio::test]
    async fn bootstrap_without_current_event_does_not_poll() {
        let (mut state, _rx) = create_test_app_state();
        state.handle_bootstrap(Ok(bootstrap(vec![event(1, false)])));

        assert_eq!(state.poller.state(), PollState::Idle);
        // The one-shot fetch for the first gameweek was still issued.
        assert!(state.live_requests.is_current(1));
    }

    #[tokio::test]
    async fn start_bootstrap_load_clears_error() {
        let (mut state, mut rx) = create_test_app_state();
        state.error = Some("Failed to load live data: HTTP 500".into());
        state.start_bootstrap_load();
        assert!(state.error.is_none());

        // UnusedSource answers with a failure.
        match rx.recv().await {
            Some(AppEvent::BootstrapLoaded(Err(FetchError::Status(500)))) => {}
            other => panic!("unexpected event: {other:?}"),
        }
    }

    // -----------------------------------------------------------------------
    // Tests: live handling
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn superseded_live_response_is_discarded() {
        let (mut state, _rx) = create_test_app_state();
        state.bootstrap = Some(Arc::new(bootstrap(vec![event(1, true)])));

        let older = state.live_requests.issue();
        let newer = state.live_requests.issue();

        assert!(state.handle_live(newer, 1, Ok(live(1, &[(5, 7)]))));
        assert!(!state.handle_live(older, 1, Ok(live(1, &[(5, 1)]))));
        assert_eq!(state.live.as_ref().unwrap().points(5), 7);
    }

    #[tokio::test]
    async fn superseded_live_error_is_not_shown() {
        let (mut state, _rx) = create_test_app_state();
        let older = state.live_requests.issue();
        let _newer = state.live_requests.issue();

        assert!(!state.handle_live(older, 1, Err(FetchError::Status(500))));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn live_failure_keeps_previous_snapshot() {
        let (mut state, _rx) = create_test_app_state();
        let first = state.live_requests.issue();
        state.handle_live(first, 1, Ok(live(1, &[(5, 7)])));
        let stamp = state.last_updated;
        assert!(stamp.is_some());

        let second = state.live_requests.issue();
        state.handle_live(second, 1, Err(FetchError::Transport("refused".into())));

        assert_eq!(
            state.error.as_deref(),
            Some("Failed to load live data: network error: refused")
        );
        assert_eq!(state.live.as_ref().unwrap().points(5), 7);
        assert_eq!(state.last_updated, stamp);
    }

    #[tokio::test]
    async fn stale_poll_tick_is_ignored() {
        let (mut state, _rx) = create_test_app_state();
        state.poller.transition(Some(3));
        state.handle_poll_tick(2);
        assert!(!state.live_requests.is_current(1));

        state.handle_poll_tick(3);
        assert!(state.live_requests.is_current(1));
    }

    // -----------------------------------------------------------------------
    // Tests: selection and snapshot
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn snapshot_joins_records_and_comparison() {
        let (mut state, _rx) = create_test_app_state();
        state.handle_bootstrap(Ok(bootstrap(vec![event(1, true)])));
        let seq = state.live_requests.issue();
        state.handle_live(seq, 1, Ok(live(1, &[(5, 6), (9, 2)])));

        let snapshot = state.build_snapshot();
        assert_eq!(snapshot.records.len(), 2);
        assert_eq!(snapshot.records[0].display, "Declan Rice");
        assert_eq!(snapshot.records[0].team.as_deref(), Some("Arsenal"));
        assert_eq!(snapshot.records[0].gameweek_points, 6);
        assert_eq!(snapshot.records[1].photo_url, "https://example.test/photos/9.jpg");
        assert_eq!(snapshot.comparison, Some(Comparison::FirstGreater));
        assert_eq!(snapshot.poll_state, PollState::Polling(1));
    }

    #[tokio::test]
    async fn select_replaces_slot_and_updates_comparison() {
        let (mut state, _rx) = create_test_app_state();
        state.handle_bootstrap(Ok(bootstrap(vec![event(1, true)])));

        state.select(Slot::First, 9);
        let snapshot = state.build_snapshot();
        assert_eq!(snapshot.selection, [Some(9), Some(9)]);
        assert_eq!(snapshot.comparison, Some(Comparison::Equal));
    }

    #[test]
    fn snapshot_before_bootstrap_has_no_records() {
        let (state, _rx) = create_test_app_state();
        let snapshot = state.build_snapshot();
        assert!(snapshot.records.is_empty());
        assert!(snapshot.comparison.is_none());
        assert_eq!(snapshot.poll_state, PollState::Idle);
    }

    // -----------------------------------------------------------------------
    // Tests: event loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn event_loop_handles_quit_command() {
        let (state, event_rx) = create_test_app_state();
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, _ui_rx) = mpsc::channel(64);

        let handle = tokio::spawn(run(event_rx, cmd_rx, ui_tx, state));
        cmd_tx.send(UserCommand::Quit).await.unwrap();

        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
