// Live-stats polling: the Idle/Polling state machine that owns the periodic
// timer, and the request sequencer that keeps out-of-order responses from
// overwriting newer data.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::protocol::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Polling(u32),
}

/// Owns the periodic tick task. Entering `Polling(id)` starts a ticker that
/// sends `AppEvent::PollTick(id)` every `period` (first tick one full period
/// after entry); leaving it aborts the ticker.
pub struct LivePoller {
    state: PollState,
    period: Duration,
    ticker: Option<JoinHandle<()>>,
    events: mpsc::Sender<AppEvent>,
}

impl LivePoller {
    pub fn new(period: Duration, events: mpsc::Sender<AppEvent>) -> Self {
        LivePoller {
            state: PollState::Idle,
            period,
            ticker: None,
            events,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Drive the machine from the resolved current gameweek. Returns `true`
    /// when the state changed.
    pub fn transition(&mut self, current_event: Option<u32>) -> bool {
        let next = match current_event {
            Some(id) => PollState::Polling(id),
            None => PollState::Idle,
        };
        if next == self.state {
            return false;
        }

        self.stop_ticker();
        if let PollState::Polling(event_id) = next {
            self.ticker = Some(self.spawn_ticker(event_id));
            info!("Polling live stats for gameweek {event_id} every {:?}", self.period);
        } else {
            info!("No current gameweek, live polling idle");
        }
        self.state = next;
        true
    }

    /// Cancel the ticker and return to `Idle`.
    pub fn stop(&mut self) {
        self.stop_ticker();
        self.state = PollState::Idle;
    }

    fn stop_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
            debug!("Stopped live poll ticker");
        }
    }

    fn spawn_ticker(&self, event_id: u32) -> JoinHandle<()> {
        let period = self.period;
        let tx = self.events.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; the entry fetch is issued
            // by the caller, so skip it.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(AppEvent::PollTick(event_id)).await.is_err() {
                    break;
                }
            }
        })
    }
}

impl Drop for LivePoller {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

/// Monotonic request counter. Only the most recently issued request's
/// result is accepted; anything older has been superseded.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    /// Issue the next sequence number.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    /// Whether a completed request is still the latest one issued.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Invalidate every outstanding request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
