//! Fan-out of counter snapshots to live observers.
//!
//! The [`UpdateBroadcaster`] owns an explicit [`ObserverRegistry`]: a map
//! from [`SubscriptionId`] to a per-observer queue, plus the most recent
//! snapshot. Each observer gets its own unbounded queue, so publishing
//! never waits on a slow connection, and a closed connection only
//! removes its own entry.
//!
//! Snapshots are full counter states, and counts never go down, so the
//! total of a snapshot acts as its version. A snapshot older than the
//! latest one published is dropped. Every observer therefore sees
//! non-decreasing snapshots in publish order, even when two assignments
//! finish their writes and publish in the opposite order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use huddle_types::{CounterState, SubscriptionId};
use tokio::sync::mpsc;
use tracing::debug;

/// The live set of observer subscriptions.
///
/// The lock is a plain [`std::sync::Mutex`]: it is never held across an
/// `.await`, and [`Subscription`] needs to release itself from `Drop`.
#[derive(Debug)]
pub struct ObserverRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Debug)]
struct RegistryInner {
    latest: CounterState,
    observers: HashMap<SubscriptionId, mpsc::UnboundedSender<CounterState>>,
}

impl ObserverRegistry {
    fn new(initial: CounterState) -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                latest: initial,
                observers: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self) -> (SubscriptionId, CounterState, mpsc::UnboundedReceiver<CounterState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId::new();
        let mut inner = self.lock();
        inner.observers.insert(id, tx);
        debug!(subscription = %id, observers = inner.observers.len(), "Observer subscribed");
        (id, inner.latest.clone(), rx)
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let removed = inner.observers.remove(&id).is_some();
        if removed {
            debug!(subscription = %id, observers = inner.observers.len(), "Observer unsubscribed");
        }
        removed
    }

    fn publish(&self, state: &CounterState) -> usize {
        let mut inner = self.lock();
        if state.total() < inner.latest.total() {
            debug!(
                total = state.total(),
                latest = inner.latest.total(),
                "Dropping stale snapshot"
            );
            return 0;
        }
        inner.latest.clone_from(state);

        let mut delivered = 0_usize;
        inner.observers.retain(|id, tx| {
            if tx.send(state.clone()).is_ok() {
                delivered = delivered.saturating_add(1);
                true
            } else {
                debug!(subscription = %id, "Observer gone, pruning");
                false
            }
        });
        delivered
    }

    fn len(&self) -> usize {
        self.lock().observers.len()
    }

    fn latest(&self) -> CounterState {
        self.lock().latest.clone()
    }
}

/// Publishes counter snapshots to every subscribed observer.
///
/// Cheap to clone; all clones share one registry.
#[derive(Debug, Clone)]
pub struct UpdateBroadcaster {
    registry: Arc<ObserverRegistry>,
}

impl UpdateBroadcaster {
    /// Create a broadcaster whose first snapshot is `initial`.
    pub fn new(initial: CounterState) -> Self {
        Self {
            registry: Arc::new(ObserverRegistry::new(initial)),
        }
    }

    /// Register a new observer.
    ///
    /// Returns the current snapshot together with the subscription, so a
    /// new observer has something to show before the next change.
    /// Registration and the snapshot read happen under the same lock as
    /// [`Self::publish`], so no update can slip in between them.
    pub fn subscribe(&self) -> (CounterState, Subscription) {
        let (id, snapshot, rx) = self.registry.register();
        let subscription = Subscription {
            id,
            rx,
            registry: Arc::clone(&self.registry),
        };
        (snapshot, subscription)
    }

    /// Deliver `state` to every registered observer.
    ///
    /// Returns the number of observers that received it. Zero observers
    /// is not an error.
    pub fn publish(&self, state: &CounterState) -> usize {
        self.registry.publish(state)
    }

    /// Remove a subscription. Unknown or already-removed ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.registry.remove(id);
    }

    /// Number of currently registered observers.
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> CounterState {
        self.registry.latest()
    }
}

/// One observer's end of the broadcast.
///
/// Dropping the subscription unregisters it.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<CounterState>,
    registry: Arc<ObserverRegistry>,
}

impl Subscription {
    /// Identifier of this subscription.
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Wait for the next published snapshot.
    ///
    /// Returns `None` once the subscription has been removed from the
    /// registry.
    pub async fn recv(&mut self) -> Option<CounterState> {
        self.rx.recv().await
    }

    /// Take a snapshot that is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<CounterState> {
        self.rx.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use huddle_types::TeamId;

    use super::*;

    fn state(red: u64, blue: u64) -> CounterState {
        [(TeamId::Red, red), (TeamId::Blue, blue)].into_iter().collect()
    }

    #[test]
    fn subscribe_returns_current_snapshot() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        broadcaster.publish(&state(2, 1));

        let (snapshot, _sub) = broadcaster.subscribe();
        assert_eq!(snapshot, state(2, 1));
        assert_eq!(broadcaster.observer_count(), 1);
    }

    #[tokio::test]
    async fn publish_reaches_every_observer_in_order() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        let (_, mut a) = broadcaster.subscribe();
        let (_, mut b) = broadcaster.subscribe();

        assert_eq!(broadcaster.publish(&state(1, 0)), 2);
        assert_eq!(broadcaster.publish(&state(1, 1)), 2);

        for sub in [&mut a, &mut b] {
            assert_eq!(sub.recv().await.unwrap(), state(1, 0));
            assert_eq!(sub.recv().await.unwrap(), state(1, 1));
        }
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        let (_, sub) = broadcaster.subscribe();
        let id = sub.id();

        broadcaster.unsubscribe(id);
        broadcaster.unsubscribe(id);
        assert_eq!(broadcaster.observer_count(), 0);

        // Dropping after an explicit unsubscribe is also a no-op.
        drop(sub);
        broadcaster.unsubscribe(id);
        assert_eq!(broadcaster.publish(&state(1, 0)), 0);
    }

    #[test]
    fn dropped_subscription_is_released() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        let (_, sub) = broadcaster.subscribe();
        let id = sub.id();
        drop(sub);

        assert_eq!(broadcaster.observer_count(), 0);
        broadcaster.unsubscribe(id);
    }

    #[tokio::test]
    async fn closed_observer_does_not_affect_others() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        let (_, mut healthy) = broadcaster.subscribe();
        let (_, mut closed) = broadcaster.subscribe();
        closed.rx.close();

        assert_eq!(broadcaster.publish(&state(0, 1)), 1);
        assert_eq!(healthy.recv().await.unwrap(), state(0, 1));
        assert_eq!(broadcaster.observer_count(), 1);
    }

    #[test]
    fn stale_snapshots_are_dropped() {
        let broadcaster = UpdateBroadcaster::new(state(0, 0));
        let (_, mut sub) = broadcaster.subscribe();

        broadcaster.publish(&state(1, 1));
        assert_eq!(broadcaster.publish(&state(1, 0)), 0);

        assert_eq!(sub.try_recv(), Some(state(1, 1)));
        assert_eq!(sub.try_recv(), None);
        assert_eq!(broadcaster.latest(), state(1, 1));
    }
}
