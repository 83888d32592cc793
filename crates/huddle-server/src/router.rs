//! Axum router construction for the Huddle API.
//!
//! Assembles the REST and event-stream routes into a single [`Router`]
//! with CORS enabled, since kiosks and dashboards are served from a
//! different origin.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /assign` -- assign the caller to a team
/// - `GET /counts` -- current counts
/// - `GET /events` -- server-sent snapshot stream
/// - `GET /teams` -- roster metadata with counts
/// - `GET /health` -- liveness check
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/assign", post(handlers::assign))
        .route("/counts", get(handlers::counts))
        .route("/events", get(sse::events))
        .route("/teams", get(handlers::teams))
        .route("/health", get(handlers::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
