//! Snapshot channels feeding the live count display.
//!
//! A channel is anything that can produce [`CounterState`] snapshots over
//! time. It reports what it is doing through [`ChannelEvent`]s so the
//! [`LiveFeed`](crate::feed::LiveFeed) can decide which channel to trust.
//!
//! - [`PushChannel`] -- the service's event stream
//! - [`PollChannel`] -- periodic reads of the local shadow counter

mod poll;
mod push;

use std::fmt;

use huddle_types::CounterState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub use poll::PollChannel;
pub use push::PushChannel;

/// Which kind of channel produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Server push over the event stream.
    Push,
    /// Local polling of the shadow counter.
    Poll,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Poll => write!(f, "poll"),
        }
    }
}

/// Lifecycle of a channel as seen by its consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is connected and will deliver snapshots.
    Open,
    /// A new snapshot.
    Snapshot(CounterState),
    /// The channel failed. It may retry on its own.
    Error(String),
    /// The channel's source ended normally.
    Closed,
}

/// An event tagged with the channel that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Producer of the event.
    pub origin: ChannelKind,
    /// What happened.
    pub event: ChannelEvent,
}

/// Sending half that channels report their events into.
pub type EventSender = mpsc::UnboundedSender<ChannelMessage>;

/// A source of counter snapshots.
pub trait SnapshotSource: Send + Sync {
    /// Which kind of channel this is.
    fn kind(&self) -> ChannelKind;

    /// Start producing events into `events`.
    ///
    /// The channel runs until the returned handle is closed or dropped.
    fn open(&self, events: EventSender) -> ChannelHandle;
}

/// Owner of a running channel. Closing or dropping it stops the channel.
#[derive(Debug)]
pub struct ChannelHandle {
    kind: ChannelKind,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// Wrap the task driving a channel of `kind`.
    pub const fn new(kind: ChannelKind, task: JoinHandle<()>) -> Self {
        Self { kind, task }
    }

    /// Kind of the channel behind this handle.
    pub const fn kind(&self) -> ChannelKind {
        self.kind
    }

    /// Whether the channel has stopped.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the channel.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tags events with their origin before sending them.
#[derive(Debug, Clone)]
pub(crate) struct Emitter {
    origin: ChannelKind,
    tx: EventSender,
}

impl Emitter {
    pub(crate) const fn new(origin: ChannelKind, tx: EventSender) -> Self {
        Self { origin, tx }
    }

    /// Send `event`. Returns false once nobody is listening.
    pub(crate) fn emit(&self, event: ChannelEvent) -> bool {
        self.tx
            .send(ChannelMessage {
                origin: self.origin,
                event,
            })
            .is_ok()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
