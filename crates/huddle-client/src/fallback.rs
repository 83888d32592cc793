//! The offline assignment simulation.
//!
//! When the service cannot answer, the kiosk still hands out a team: it
//! waits a short simulated latency, then runs the same balancing rule as
//! the service against a shadow counter kept in the [`LocalStore`].
//!
//! The shadow counter only sees assignments made on this kiosk while it
//! was offline. It is never merged back into the service's counts.

use std::time::Duration;

use huddle_core::{Roster, pick_random};
use huddle_types::{CounterState, TeamId};
use tokio::sync::Mutex;
use tracing::info;

use crate::error::ClientError;
use crate::storage::LocalStore;

/// Assigns teams from the local shadow counter.
#[derive(Debug)]
pub struct LocalSimulator {
    store: LocalStore,
    roster: Roster,
    delay: Duration,
    // Serializes read-pick-write on the shadow record within this process.
    lock: Mutex<()>,
}

impl LocalSimulator {
    /// Create a simulator over `store` that waits `delay` before each
    /// assignment.
    pub fn new(store: LocalStore, roster: Roster, delay: Duration) -> Self {
        Self {
            store,
            roster,
            delay,
            lock: Mutex::new(()),
        }
    }

    /// Pick a least-populated team from the shadow counter, count it, and
    /// persist the counter.
    pub async fn assign(&self) -> Result<TeamId, ClientError> {
        tokio::time::sleep(self.delay).await;

        let _guard = self.lock.lock().await;
        let mut counts = self.store.shadow_counts(&self.roster).await;
        let team = pick_random(&counts)?;
        counts.increment(team);
        self.store.save_shadow_counts(&counts).await?;
        info!(%team, offline_total = counts.total(), "Team assigned locally");
        Ok(team)
    }

    /// Current shadow counters.
    pub async fn counts(&self) -> CounterState {
        self.store.shadow_counts(&self.roster).await
    }
}
