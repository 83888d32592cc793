//! Server-sent event stream of counter snapshots.
//!
//! Clients connect to `GET /events`. The first event is the current
//! snapshot; after that one event is sent per change. Every event carries
//! the full counter state as JSON in its `data:` line.
//!
//! The stream owns the observer's [`Subscription`]. When the client goes
//! away Axum drops the stream, and the stream calls
//! [`AssignmentService::unsubscribe`](crate::service::AssignmentService::unsubscribe)
//! for it before the subscription itself is released.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt, stream};
use huddle_types::CounterState;
use tracing::{debug, warn};

use crate::broadcaster::Subscription;
use crate::state::AppState;

/// Interval between keep-alive comments on an idle stream.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// One observer's end of the stream. Dropping it unsubscribes.
struct Observer {
    subscription: Subscription,
    state: Arc<AppState>,
}

impl Drop for Observer {
    fn drop(&mut self) {
        let id = self.subscription.id();
        self.state.service.unsubscribe(id);
        debug!(subscription = %id, "Event stream closed");
    }
}

/// Open a snapshot stream for one observer.
///
/// # Route
///
/// `GET /events`
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (initial, subscription) = state.service.subscribe();
    debug!(subscription = %subscription.id(), total = initial.total(), "Event stream opened");

    let observer = Observer { subscription, state };
    let updates = stream::unfold(observer, |mut observer| async move {
        let next = observer.subscription.recv().await?;
        Some((next, observer))
    });

    let events = stream::once(async move { initial })
        .chain(updates)
        .map(|snapshot| Ok(snapshot_event(&snapshot)));

    Sse::new(events).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

fn snapshot_event(snapshot: &CounterState) -> Event {
    match serde_json::to_string(snapshot) {
        Ok(json) => Event::default().data(json),
        Err(e) => {
            warn!("Failed to serialize counter snapshot: {e}");
            Event::default().comment("snapshot unavailable")
        }
    }
}
