//! Shared application state for the Huddle server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use huddle_core::{HuddleConfig, Roster};
use huddle_store::{CounterStore, StoreError};

use crate::service::AssignmentService;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The assignment service (store + broadcaster).
    pub service: AssignmentService,
    /// When this process started serving.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Wrap an existing service.
    pub fn new(service: AssignmentService) -> Self {
        Self {
            service,
            started_at: Utc::now(),
        }
    }

    /// Open the counter store at `config.store.path` for `roster` and
    /// build the state around it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be opened.
    pub async fn open(config: &HuddleConfig, roster: Roster) -> Result<Self, StoreError> {
        let store = CounterStore::open(config.store.path.clone(), roster).await?;
        let service = AssignmentService::new(Arc::new(store)).await;
        Ok(Self::new(service))
    }
}
