//! Polling the local shadow counter.

use std::time::Duration;

use huddle_core::Roster;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::{ChannelEvent, ChannelHandle, ChannelKind, EventSender, Emitter, SnapshotSource};
use crate::storage::LocalStore;

/// Reads the shadow counter immediately and then once per interval.
#[derive(Debug, Clone)]
pub struct PollChannel {
    store: LocalStore,
    roster: Roster,
    interval: Duration,
}

impl PollChannel {
    /// Poll `store` every `interval`. `interval` must be non-zero.
    pub const fn new(store: LocalStore, roster: Roster, interval: Duration) -> Self {
        Self {
            store,
            roster,
            interval,
        }
    }
}

impl SnapshotSource for PollChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Poll
    }

    fn open(&self, events: EventSender) -> ChannelHandle {
        let emitter = Emitter::new(ChannelKind::Poll, events);
        let store = self.store.clone();
        let roster = self.roster.clone();
        let interval = self.interval;

        let task = tokio::spawn(async move {
            debug!(interval_ms = interval.as_millis(), "Poll channel started");
            if !emitter.emit(ChannelEvent::Open) {
                return;
            }
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let counts = store.shadow_counts(&roster).await;
                if !emitter.emit(ChannelEvent::Snapshot(counts)) {
                    return;
                }
            }
        });
        ChannelHandle::new(ChannelKind::Poll, task)
    }
}
