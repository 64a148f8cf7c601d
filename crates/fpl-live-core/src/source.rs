// Relay-mediated access to the two upstream resources the dashboard reads.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::model::{Bootstrap, LivePayload, LiveStats};

pub const BOOTSTRAP_PATH: &str = "bootstrap-static/";

/// Upstream sub-path for one gameweek's live stats.
pub fn live_path(event_id: u32) -> String {
    format!("event/{event_id}/live/")
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    Parse(String),
}

/// Where the dashboard gets its data from.
#[async_trait]
pub trait FplSource: Send + Sync {
    async fn bootstrap(&self) -> Result<Bootstrap, FetchError>;
    async fn live(&self, event_id: u32) -> Result<LiveStats, FetchError>;
}

/// Fetches through the relay endpoint (`<endpoint>?path=<sub-path>`).
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        debug!(path, "relay fetch");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("path", path)])
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        parse_body(&body)
    }
}

#[async_trait]
impl FplSource for RelayClient {
    async fn bootstrap(&self) -> Result<Bootstrap, FetchError> {
        self.get_json(BOOTSTRAP_PATH).await
    }

    async fn live(&self, event_id: u32) -> Result<LiveStats, FetchError> {
        let payload: LivePayload = self.get_json(&live_path(event_id)).await?;
        Ok(LiveStats::new(event_id, payload))
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
