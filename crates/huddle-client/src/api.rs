//! HTTP calls to the authoritative service.
//!
//! The [`ApiClient`] turns every way a request can go wrong into a
//! distinct [`ClientError`] variant, so the agent can log what happened
//! before it falls back to the local path.

use std::time::Duration;

use huddle_types::{AssignmentResult, CounterState, TeamId};
use tracing::debug;

use crate::error::ClientError;

/// Client for the service's REST endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for the service at `base_url`.
    ///
    /// `timeout` bounds each REST request from connect to the end of the
    /// body. The event stream uses it for the handshake only.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
        })
    }

    /// Ask the service to assign a team.
    pub async fn assign(&self) -> Result<TeamId, ClientError> {
        let url = format!("{}/assign", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: AssignmentResult = response.json().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout)
            } else {
                ClientError::InvalidResponse(format!("assign response parse failed: {e}"))
            }
        })?;
        debug!(team = %body.assigned_team, "Service assigned a team");
        Ok(body.assigned_team)
    }

    /// Fetch the current counters.
    pub async fn counts(&self) -> Result<CounterState, ClientError> {
        let url = format!("{}/counts", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("counts response parse failed: {e}")))
    }

    /// URL of the live event stream.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    /// The underlying HTTP client, shared with the push channel.
    pub const fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn classify(&self, error: &reqwest::Error) -> ClientError {
        if error.is_timeout() {
            ClientError::Timeout(self.timeout)
        } else {
            ClientError::Network(error.to_string())
        }
    }
}
