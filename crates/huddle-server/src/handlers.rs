//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/assign` | Assign the caller to a team |
//! | `GET` | `/counts` | Current per-team counts |
//! | `GET` | `/teams` | Roster with display metadata and counts |
//! | `GET` | `/health` | Liveness and observer count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use huddle_types::{AssignmentResult, CounterState, TeamSummary};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /assign
// ---------------------------------------------------------------------------

/// Assign the caller to the least-populated team.
///
/// Responds with `{"assignedTeam": "<team>"}`.
pub async fn assign(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AssignmentResult>, ApiError> {
    let assigned_team = state.service.assign().await?;
    Ok(Json(AssignmentResult { assigned_team }))
}

// ---------------------------------------------------------------------------
// GET /counts
// ---------------------------------------------------------------------------

/// Return the full counter state as a flat `team -> count` object.
pub async fn counts(State(state): State<Arc<AppState>>) -> Json<CounterState> {
    Json(state.service.counts().await)
}

// ---------------------------------------------------------------------------
// GET /teams
// ---------------------------------------------------------------------------

/// Return one row per rostered team with its display metadata and count.
pub async fn teams(State(state): State<Arc<AppState>>) -> Json<Vec<TeamSummary>> {
    Json(state.service.counts().await.summaries())
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness check.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counts = state.service.counts().await;
    Json(serde_json::json!({
        "status": "ok",
        "observers": state.service.broadcaster().observer_count(),
        "total": counts.total(),
        "startedAt": state.started_at,
    }))
}
