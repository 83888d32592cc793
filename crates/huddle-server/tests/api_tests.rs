//! Integration tests for the Huddle API.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Each test gets its own counter record in a
//! temporary directory.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use huddle_core::Roster;
use huddle_server::router::build_router;
use huddle_server::{AppState, AssignmentService, ServiceError};
use huddle_store::CounterStore;
use huddle_types::{CounterState, TeamId};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

async fn make_state_at(path: &Path) -> Arc<AppState> {
    let store = CounterStore::open(path, Roster::default()).await.unwrap();
    let service = AssignmentService::new(Arc::new(store)).await;
    Arc::new(AppState::new(service))
}

async fn make_test_state() -> (TempDir, Arc<AppState>) {
    let dir = TempDir::new().unwrap();
    let state = make_state_at(&dir.path().join("db.json")).await;
    (dir, state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read the next `data:` payload from an event-stream body.
async fn next_snapshot(
    stream: &mut (impl futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin),
    buffer: &mut String,
) -> CounterState {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let frame: String = buffer.drain(..end + 2).collect();
            if let Some(data) = frame.lines().find_map(|l| l.strip_prefix("data:")) {
                return serde_json::from_str(data.trim()).unwrap();
            }
            continue;
        }
        let chunk = stream.next().await.unwrap().unwrap();
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

fn post_assign() -> Request<Body> {
    Request::post("/assign").body(Body::empty()).unwrap()
}

// =========================================================================
// REST
// =========================================================================

#[tokio::test]
async fn test_assign_returns_team_and_updates_counts() {
    let (_dir, state) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(post_assign())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let team: TeamId = serde_json::from_value(json["assignedTeam"].clone()).unwrap();

    let counts = state.service.counts().await;
    assert_eq!(counts.get(team), Some(1));
    assert_eq!(counts.total(), 1);
}

#[tokio::test]
async fn test_counts_returns_flat_mapping() {
    let (_dir, state) = make_test_state().await;
    state.service.assign().await.unwrap();
    state.service.assign().await.unwrap();

    let response = build_router(state)
        .oneshot(Request::get("/counts").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 6);
    for team in TeamId::ALL {
        assert!(object.contains_key(team.as_str()));
    }
    let total: u64 = object.values().map(|v| v.as_u64().unwrap()).sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_teams_lists_metadata() {
    let (_dir, state) = make_test_state().await;

    let response = build_router(state)
        .oneshot(Request::get("/teams").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json.as_array().unwrap().len(), 6);
    assert_eq!(json[0]["id"], "red");
    assert_eq!(json[0]["name"], "Phoenix Red");
    assert_eq!(json[0]["count"], 0);
}

#[tokio::test]
async fn test_health_reports_observers() {
    let (_dir, state) = make_test_state().await;
    let (_, _subscription) = state.service.subscribe();

    let response = build_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["observers"], 1);
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn test_assign_never_picks_a_team_above_the_minimum() {
    for _ in 0..20 {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            br#"{"red":0,"blue":0,"green":1,"yellow":0,"purple":0,"orange":0}"#,
        )
        .unwrap();
        let state = make_state_at(&path).await;
        let before = state.service.counts().await;

        let response = build_router(Arc::clone(&state))
            .oneshot(post_assign())
            .await
            .unwrap();
        let json = body_to_json(response.into_body()).await;
        let team: TeamId = serde_json::from_value(json["assignedTeam"].clone()).unwrap();
        assert_ne!(team, TeamId::Green);

        let after = state.service.counts().await;
        for (other, count) in after.iter() {
            if other == team {
                assert_eq!(count, 1);
            } else {
                assert_eq!(Some(count), before.get(other));
            }
        }
    }
}

#[tokio::test]
async fn test_storage_failure_returns_error_without_broadcast() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir(&data_dir).unwrap();
    let state = make_state_at(&data_dir.join("db.json")).await;
    let (_, mut subscription) = state.service.subscribe();

    std::fs::remove_dir_all(&data_dir).unwrap();

    let direct = state.service.assign().await;
    assert!(matches!(direct, Err(ServiceError::Storage(_))));

    let response = build_router(Arc::clone(&state))
        .oneshot(post_assign())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 500);
    assert!(json["error"].is_string());

    assert_eq!(subscription.try_recv(), None);
    assert_eq!(state.service.counts().await.total(), 0);
}

// =========================================================================
// Concurrency
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_assignments_are_not_lost() {
    let (_dir, state) = make_test_state().await;

    let mut handles = Vec::new();
    for _ in 0..200 {
        let state = Arc::clone(&state);
        handles.push(tokio::spawn(async move { state.service.assign().await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(state.service.counts().await.total(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_burst_is_exactly_balanced() {
    let (_dir, state) = make_test_state().await;

    let handles: Vec<_> = (0..600)
        .map(|_| {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.service.assign().await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let counts = state.service.counts().await;
    assert!(counts.iter().all(|(_, count)| count == 100));
}

// =========================================================================
// Live updates
// =========================================================================

#[tokio::test]
async fn test_new_subscriber_gets_current_snapshot() {
    let (_dir, state) = make_test_state().await;
    for _ in 0..3 {
        state.service.assign().await.unwrap();
    }

    let (snapshot, _subscription) = state.service.subscribe();
    assert_eq!(snapshot.total(), 3);
    assert_eq!(snapshot, state.service.counts().await);
}

#[tokio::test]
async fn test_subscriber_sees_every_assignment_in_order() {
    let (_dir, state) = make_test_state().await;
    let (_, mut subscription) = state.service.subscribe();

    for expected in 1..=5_u64 {
        state.service.assign().await.unwrap();
        let snapshot = subscription.recv().await.unwrap();
        assert_eq!(snapshot.total(), expected);
    }
}

#[tokio::test]
async fn test_events_stream_starts_with_current_snapshot() {
    let (_dir, state) = make_test_state().await;
    for _ in 0..3 {
        state.service.assign().await.unwrap();
    }

    let response = build_router(Arc::clone(&state))
        .oneshot(Request::get("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/event-stream"));

    let mut stream = response.into_body().into_data_stream();
    let mut buffer = String::new();
    let first = next_snapshot(&mut stream, &mut buffer).await;
    assert_eq!(first.total(), 3);
    assert_eq!(first, state.service.counts().await);

    state.service.assign().await.unwrap();
    let second = next_snapshot(&mut stream, &mut buffer).await;
    assert_eq!(second.total(), 4);
}

#[tokio::test]
async fn test_closing_event_stream_unsubscribes() {
    let (_dir, state) = make_test_state().await;

    let response = build_router(Arc::clone(&state))
        .oneshot(Request::get("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(state.service.broadcaster().observer_count(), 1);

    drop(response);
    assert_eq!(state.service.broadcaster().observer_count(), 0);

    // Publishing with nobody listening is fine.
    state.service.assign().await.unwrap();
}
