//! The assignment transaction.

use std::sync::Arc;

use huddle_core::{AssignError, pick_random};
use huddle_store::{CounterStore, StoreError};
use huddle_types::{CounterState, SubscriptionId, TeamId};
use tracing::{error, info};

use crate::broadcaster::{Subscription, UpdateBroadcaster};

/// Errors returned by [`AssignmentService::assign`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The counter record could not be read or written.
    #[error("storage error: {0}")]
    Storage(StoreError),

    /// There is no team to assign. Only reachable with an invalid roster.
    #[error("configuration error: {0}")]
    Configuration(AssignError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Assign(e) => Self::Configuration(e),
            other => Self::Storage(other),
        }
    }
}

/// Assigns callers to teams and keeps observers up to date.
#[derive(Debug, Clone)]
pub struct AssignmentService {
    store: Arc<CounterStore>,
    broadcaster: UpdateBroadcaster,
}

impl AssignmentService {
    /// Build a service over `store`, seeding the broadcaster with the
    /// store's current counters.
    pub async fn new(store: Arc<CounterStore>) -> Self {
        let broadcaster = UpdateBroadcaster::new(store.read().await);
        Self { store, broadcaster }
    }

    /// Assign one caller.
    ///
    /// The least-populated team is chosen and incremented while the store
    /// lock is held, so a burst of concurrent calls is balanced exactly.
    /// The new snapshot is published only after it is on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Storage`] if the increment could not be
    /// persisted. Observers receive nothing in that case.
    pub async fn assign(&self) -> Result<TeamId, ServiceError> {
        let (team, state) = self.store.transact(pick_random).await.map_err(|e| {
            error!(error = %e, "Assignment failed");
            ServiceError::from(e)
        })?;

        let observers = self.broadcaster.publish(&state);
        info!(%team, total = state.total(), observers, "Team assigned");
        Ok(team)
    }

    /// Current counters.
    pub async fn counts(&self) -> CounterState {
        self.store.read().await
    }

    /// Register a live observer. See [`UpdateBroadcaster::subscribe`].
    pub fn subscribe(&self) -> (CounterState, Subscription) {
        self.broadcaster.subscribe()
    }

    /// Remove a live observer. Idempotent.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }

    /// The broadcaster used for live updates.
    pub const fn broadcaster(&self) -> &UpdateBroadcaster {
        &self.broadcaster
    }

    /// The underlying counter store.
    pub fn store(&self) -> &CounterStore {
        &self.store
    }
}
