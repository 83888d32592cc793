//! The kiosk's vote state machine.
//!
//! ```text
//!   Unvoted --request_assignment--> Voted --reset--> Unvoted
//! ```
//!
//! The state lives in the [`LocalStore`], so it survives a kiosk restart.
//! A request while already voted returns the recorded team and makes no
//! network call.

use std::sync::Arc;

use huddle_types::{CounterState, TeamId, UserAssignmentRecord};
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::channel::{PollChannel, PushChannel, SnapshotSource};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::fallback::LocalSimulator;
use crate::feed::LiveFeed;
use crate::storage::LocalStore;

/// Whether the person at the kiosk already has a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteState {
    /// No team yet.
    Unvoted,
    /// A team was assigned.
    Voted(UserAssignmentRecord),
}

impl VoteState {
    fn from_record(record: UserAssignmentRecord) -> Self {
        if record.has_voted && record.team().is_some() {
            Self::Voted(record)
        } else {
            Self::Unvoted
        }
    }

    /// The assigned team, if any.
    pub const fn team(&self) -> Option<TeamId> {
        match self {
            Self::Unvoted => None,
            Self::Voted(record) => record.team(),
        }
    }
}

/// Where an assigned team came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentSource {
    /// The authoritative service decided it.
    Authoritative,
    /// The service was unavailable; the local simulation decided it.
    LocalFallback,
    /// The person already had a team; nothing new was assigned.
    AlreadyAssigned,
}

/// Result of a successful [`ClientSyncAgent::request_assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentOutcome {
    /// The team to show.
    pub team: TeamId,
    /// Who decided it.
    pub source: AssignmentSource,
}

/// Client-side coordinator for one kiosk.
#[derive(Debug)]
pub struct ClientSyncAgent {
    config: ClientConfig,
    api: Option<ApiClient>,
    store: LocalStore,
    simulator: LocalSimulator,
    // Serializes state transitions so a double press assigns only once.
    transition: Mutex<()>,
}

impl ClientSyncAgent {
    /// Build an agent from `config`.
    ///
    /// In simulation mode no HTTP client is created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = if config.simulation_mode {
            info!("Simulation mode: the service will not be contacted");
            None
        } else {
            Some(ApiClient::new(&config.api_base_url, config.request_timeout)?)
        };
        let store = LocalStore::new(config.state_dir.clone());
        let simulator =
            LocalSimulator::new(store.clone(), config.roster.clone(), config.fallback_delay);
        Ok(Self {
            config,
            api,
            store,
            simulator,
            transition: Mutex::new(()),
        })
    }

    /// Configuration the agent was built with.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current vote state. A corrupt record reads as [`VoteState::Unvoted`].
    pub async fn state(&self) -> VoteState {
        VoteState::from_record(self.store.user_record().await)
    }

    /// Get a team for the person at the kiosk.
    ///
    /// Service failures of any kind (timeout, network, bad status, bad
    /// body) are logged and answered by the local fallback. Only a
    /// failure of the local path itself is returned as an error.
    pub async fn request_assignment(&self) -> Result<AssignmentOutcome, ClientError> {
        let _guard = self.transition.lock().await;

        if let Some(team) = self.state().await.team() {
            info!(%team, "Already assigned, returning recorded team");
            return Ok(AssignmentOutcome {
                team,
                source: AssignmentSource::AlreadyAssigned,
            });
        }

        let outcome = match self.ask_service().await {
            Some(team) => AssignmentOutcome {
                team,
                source: AssignmentSource::Authoritative,
            },
            None => AssignmentOutcome {
                team: self.simulator.assign().await?,
                source: AssignmentSource::LocalFallback,
            },
        };

        self.store
            .save_user_record(&UserAssignmentRecord::voted(outcome.team))
            .await?;
        info!(team = %outcome.team, source = ?outcome.source, "Team assigned");
        Ok(outcome)
    }

    /// Forget the current assignment so the next person can go.
    ///
    /// Purely local; the service's counts are not touched.
    pub async fn reset(&self) -> Result<(), ClientError> {
        let _guard = self.transition.lock().await;
        self.store.clear_user_record().await?;
        info!("Kiosk reset for the next person");
        Ok(())
    }

    /// Start the live count feed.
    ///
    /// Outside simulation mode the feed prefers the service's event
    /// stream and polls the local shadow counts while it is down.
    pub fn subscribe(&self) -> (LiveFeed, mpsc::UnboundedReceiver<CounterState>) {
        let poll = Arc::new(PollChannel::new(
            self.store.clone(),
            self.config.roster.clone(),
            self.config.poll_interval,
        ));
        let push = self.api.as_ref().map(|api| {
            Arc::new(PushChannel::new(
                api.http().clone(),
                api.events_url(),
                self.config.request_timeout,
                self.config.reconnect_delay,
            )) as Arc<dyn SnapshotSource>
        });
        LiveFeed::start(push, poll)
    }

    /// The offline shadow counts.
    pub async fn offline_counts(&self) -> CounterState {
        self.simulator.counts().await
    }

    async fn ask_service(&self) -> Option<TeamId> {
        let api = self.api.as_ref()?;
        match api.assign().await {
            Ok(team) if self.config.roster.contains(team) => Some(team),
            Ok(team) => {
                warn!(%team, "Service assigned a team outside the local roster, using local fallback");
                None
            }
            Err(e) => {
                warn!(error = %e, "Service unavailable, using local fallback");
                None
            }
        }
    }
}
