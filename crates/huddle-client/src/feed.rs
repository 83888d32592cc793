//! The live count feed.
//!
//! A [`LiveFeed`] owns a push channel and a poll channel and decides
//! which one the display listens to:
//!
//! ```text
//!   Connecting --push Open--> Push --push Error/Closed--> Poll
//!        |                     ^                            |
//!        +--push Error/Closed--+--------push Open-----------+
//! ```
//!
//! While the push channel is down it keeps retrying on its own, and the
//! poll channel fills in with the local shadow counts. As soon as push
//! reopens, polling stops. Snapshots are forwarded only from the channel
//! that matches the current mode, so a late poll result never overwrites
//! a fresh server snapshot.

use std::sync::Arc;

use huddle_types::CounterState;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::channel::{ChannelEvent, ChannelHandle, ChannelKind, ChannelMessage, SnapshotSource};

/// Which channel the feed is listening to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Waiting for the push channel's first event.
    Connecting,
    /// Server snapshots over the event stream.
    Push,
    /// Local shadow counts, polled.
    Poll,
    /// The snapshot receiver went away and the feed stopped.
    Closed,
}

/// Supervisor of the live snapshot channels.
///
/// Closing or dropping the feed stops every channel it opened.
#[derive(Debug)]
pub struct LiveFeed {
    mode: watch::Receiver<FeedMode>,
    task: JoinHandle<()>,
}

impl LiveFeed {
    /// Start the feed.
    ///
    /// With a `push` source the feed starts in [`FeedMode::Connecting`];
    /// without one it polls from the start. Snapshots arrive on the
    /// returned receiver.
    pub fn start(
        push: Option<Arc<dyn SnapshotSource>>,
        poll: Arc<dyn SnapshotSource>,
    ) -> (Self, mpsc::UnboundedReceiver<CounterState>) {
        let (snapshots_tx, snapshots_rx) = mpsc::unbounded_channel();
        let (mode_tx, mode_rx) = watch::channel(FeedMode::Connecting);
        let task = tokio::spawn(supervise(push, poll, snapshots_tx, mode_tx));
        (
            Self {
                mode: mode_rx,
                task,
            },
            snapshots_rx,
        )
    }

    /// Current mode.
    pub fn mode(&self) -> FeedMode {
        *self.mode.borrow()
    }

    /// A receiver that observes every mode change.
    pub fn watch_mode(&self) -> watch::Receiver<FeedMode> {
        self.mode.clone()
    }

    /// Stop the feed and every channel it opened.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        // The channel handles live inside the task; aborting it drops them.
        self.task.abort();
    }
}

struct Supervisor {
    poll: Arc<dyn SnapshotSource>,
    events: mpsc::UnboundedSender<ChannelMessage>,
    poll_handle: Option<ChannelHandle>,
    mode: watch::Sender<FeedMode>,
}

impl Supervisor {
    fn current(&self) -> FeedMode {
        *self.mode.borrow()
    }

    fn set_mode(&self, next: FeedMode) {
        let previous = self.mode.send_replace(next);
        if previous != next {
            info!(from = ?previous, to = ?next, "Live feed mode changed");
        }
    }

    fn start_polling(&mut self) {
        if self.poll_handle.is_none() {
            self.poll_handle = Some(self.poll.open(self.events.clone()));
        }
        self.set_mode(FeedMode::Poll);
    }

    fn stop_polling(&mut self) {
        if let Some(handle) = self.poll_handle.take() {
            debug!("Stopping local polling");
            handle.close();
        }
    }
}

async fn supervise(
    push: Option<Arc<dyn SnapshotSource>>,
    poll: Arc<dyn SnapshotSource>,
    snapshots: mpsc::UnboundedSender<CounterState>,
    mode: watch::Sender<FeedMode>,
) {
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut supervisor = Supervisor {
        poll,
        events: events_tx.clone(),
        poll_handle: None,
        mode,
    };

    // Held until the supervisor exits; dropping it stops the push channel.
    let push_handle = push.map(|source| source.open(events_tx));
    if push_handle.is_none() {
        supervisor.start_polling();
    }

    while let Some(ChannelMessage { origin, event }) = events_rx.recv().await {
        match (origin, event) {
            (ChannelKind::Push, ChannelEvent::Open) => {
                supervisor.stop_polling();
                supervisor.set_mode(FeedMode::Push);
            }
            (ChannelKind::Push, ChannelEvent::Error(reason)) => {
                debug!(%reason, "Push channel down, polling local counts");
                supervisor.start_polling();
            }
            (ChannelKind::Push, ChannelEvent::Closed) => supervisor.start_polling(),
            (origin, ChannelEvent::Snapshot(snapshot)) => {
                let wanted = match origin {
                    ChannelKind::Push => FeedMode::Push,
                    ChannelKind::Poll => FeedMode::Poll,
                };
                if supervisor.current() == wanted && snapshots.send(snapshot).is_err() {
                    debug!("Snapshot receiver gone, stopping live feed");
                    break;
                }
            }
            (ChannelKind::Poll, event) => debug!(?event, "Poll channel event"),
        }
    }

    supervisor.stop_polling();
    supervisor.set_mode(FeedMode::Closed);
}
