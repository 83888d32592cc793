//! Configuration for the kiosk client.
//!
//! All configuration is loaded from environment variables. Every variable
//! is optional; the defaults point at a service on the local machine.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use huddle_core::Roster;
use huddle_types::TeamId;

use crate::error::ClientError;

/// Default base URL of the authoritative service.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3001";

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the authoritative service (e.g. `http://127.0.0.1:3001`).
    pub api_base_url: String,
    /// When true the service is never contacted and every assignment uses
    /// the local fallback.
    pub simulation_mode: bool,
    /// Deadline for one assignment request, connect to body.
    pub request_timeout: Duration,
    /// Simulated latency before a local fallback assignment completes.
    pub fallback_delay: Duration,
    /// How often the poll channel reads the local shadow counts.
    pub poll_interval: Duration,
    /// Wait between push channel reconnect attempts.
    pub reconnect_delay: Duration,
    /// Directory holding the client-local records.
    pub state_dir: PathBuf,
    /// Teams the local fallback chooses from and the offline display
    /// shows. Should match the service's roster.
    pub roster: Roster,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            simulation_mode: false,
            request_timeout: Duration::from_millis(1500),
            fallback_delay: Duration::from_millis(500),
            poll_interval: Duration::from_millis(2000),
            reconnect_delay: Duration::from_millis(3000),
            state_dir: PathBuf::from(".huddle"),
            roster: Roster::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `HUDDLE_API_BASE_URL` -- service base URL (default `http://127.0.0.1:3001`)
    /// - `HUDDLE_SIMULATION_MODE` -- skip the network entirely (default `false`)
    /// - `HUDDLE_REQUEST_TIMEOUT_MS` -- assignment deadline (default 1500)
    /// - `HUDDLE_FALLBACK_DELAY_MS` -- simulated fallback latency (default 500)
    /// - `HUDDLE_POLL_INTERVAL_MS` -- offline polling period (default 2000)
    /// - `HUDDLE_RECONNECT_DELAY_MS` -- push reconnect wait (default 3000)
    /// - `HUDDLE_STATE_DIR` -- local record directory (default `.huddle`)
    /// - `HUDDLE_TEAMS` -- comma-separated team names (default all six)
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("HUDDLE_API_BASE_URL")
            .map_or(defaults.api_base_url, |url| url.trim_end_matches('/').to_owned());
        if api_base_url.is_empty() {
            return Err(ClientError::Config(
                "HUDDLE_API_BASE_URL must not be empty".to_owned(),
            ));
        }

        let simulation_mode =
            parse_var(&lookup, "HUDDLE_SIMULATION_MODE")?.unwrap_or(defaults.simulation_mode);
        let request_timeout =
            millis_var(&lookup, "HUDDLE_REQUEST_TIMEOUT_MS")?.unwrap_or(defaults.request_timeout);
        let fallback_delay =
            millis_var(&lookup, "HUDDLE_FALLBACK_DELAY_MS")?.unwrap_or(defaults.fallback_delay);
        let poll_interval =
            millis_var(&lookup, "HUDDLE_POLL_INTERVAL_MS")?.unwrap_or(defaults.poll_interval);
        let reconnect_delay =
            millis_var(&lookup, "HUDDLE_RECONNECT_DELAY_MS")?.unwrap_or(defaults.reconnect_delay);

        if poll_interval.is_zero() {
            return Err(ClientError::Config(
                "HUDDLE_POLL_INTERVAL_MS must be greater than zero".to_owned(),
            ));
        }

        let state_dir = lookup("HUDDLE_STATE_DIR").map_or(defaults.state_dir, PathBuf::from);
        let roster = roster_var(&lookup)?.unwrap_or(defaults.roster);

        Ok(Self {
            api_base_url,
            simulation_mode,
            request_timeout,
            fallback_delay,
            poll_interval,
            reconnect_delay,
            state_dir,
            roster,
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ClientError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| ClientError::Config(format!("invalid {name}: {e}")))
        })
        .transpose()
}

fn millis_var<F>(lookup: &F, name: &str) -> Result<Option<Duration>, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_var::<F, u64>(lookup, name)?.map(Duration::from_millis))
}

fn roster_var<F>(lookup: &F) -> Result<Option<Roster>, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup("HUDDLE_TEAMS") else {
        return Ok(None);
    };
    let teams = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            TeamId::from_name(name)
                .ok_or_else(|| ClientError::Config(format!("invalid HUDDLE_TEAMS: unknown team {name:?}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Roster::new(teams)
        .map(Some)
        .map_err(|e| ClientError::Config(format!("invalid HUDDLE_TEAMS: {e}")))
}
