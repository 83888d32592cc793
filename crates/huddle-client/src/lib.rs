//! Kiosk-side sync agent for Huddle.
//!
//! The [`ClientSyncAgent`] asks the authoritative service for a team and
//! remembers the answer locally. When the service cannot be reached in
//! time it runs the same balancing algorithm against a local shadow
//! counter instead, so the person in front of the kiosk always gets a
//! team.
//!
//! Live counts come from a [`LiveFeed`]: it prefers the server's event
//! stream and falls back to polling the local shadow counter while the
//! stream is down.
//!
//! # Modules
//!
//! - [`agent`] -- the vote state machine
//! - [`api`] -- HTTP calls to the authoritative service
//! - [`channel`] -- push and poll snapshot channels
//! - [`feed`] -- switches between the channels on lifecycle events
//! - [`fallback`] -- the offline assignment simulation
//! - [`storage`] -- client-local persisted records
//! - [`config`] -- environment-driven configuration

pub mod agent;
pub mod api;
pub mod channel;
pub mod config;
pub mod error;
pub mod fallback;
pub mod feed;
pub mod storage;

pub use agent::{AssignmentOutcome, AssignmentSource, ClientSyncAgent, VoteState};
pub use config::ClientConfig;
pub use error::ClientError;
pub use feed::{FeedMode, LiveFeed};
