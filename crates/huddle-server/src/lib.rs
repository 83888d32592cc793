//! Authoritative assignment service for Huddle.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`POST /assign`** -- assign the caller to the least-populated team
//! - **`GET /counts`** -- the current per-team counts
//! - **`GET /events`** -- a server-sent event stream of count snapshots
//!   (the current snapshot on connect, then one per change)
//! - **`GET /teams`** and **`GET /health`** -- roster metadata for
//!   dashboards and a liveness check
//!
//! # Architecture
//!
//! [`AssignmentService`] runs each assignment as one transaction against
//! the [`CounterStore`](huddle_store::CounterStore): decide, increment and
//! persist under the store lock, then publish the new snapshot through
//! the [`UpdateBroadcaster`]. Observers each drain their own queue, so a
//! slow dashboard never holds up an assignment.

pub mod broadcaster;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod service;
pub mod sse;
pub mod state;

// Re-export primary types for convenience.
pub use broadcaster::{ObserverRegistry, Subscription, UpdateBroadcaster};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use service::{AssignmentService, ServiceError};
pub use state::AppState;
