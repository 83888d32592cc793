//! Integration tests for the live count feed against a real service.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use common::{
    app_state, closed_addr, serve_on, silent_addr, spawn_server, test_config, wait_for_mode,
};
use huddle_client::{ClientConfig, ClientSyncAgent, FeedMode};
use huddle_types::CounterState;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedReceiver;

async fn next_with_total(rx: &mut UnboundedReceiver<CounterState>, total: u64) -> CounterState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = rx.recv().await.unwrap();
            if snapshot.total() == total {
                return snapshot;
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_feed_streams_service_snapshots() {
    let dir = TempDir::new().unwrap();
    let server = spawn_server(dir.path()).await;
    let agent = ClientSyncAgent::new(test_config(&server.base_url(), dir.path())).unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Push).await;

    let initial = next_with_total(&mut rx, 0).await;
    assert_eq!(initial.len(), 6);

    server.state.service.assign().await.unwrap();
    server.state.service.assign().await.unwrap();
    let latest = next_with_total(&mut rx, 2).await;
    assert_eq!(latest, server.state.service.counts().await);
    assert_eq!(feed.mode(), FeedMode::Push);
}

#[tokio::test]
async fn test_feed_polls_shadow_counts_while_service_is_down() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&format!("http://{}", closed_addr().await), dir.path());
    let agent = ClientSyncAgent::new(config).unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Poll).await;
    next_with_total(&mut rx, 0).await;

    let outcome = agent.request_assignment().await.unwrap();
    let snapshot = next_with_total(&mut rx, 1).await;
    assert_eq!(snapshot.get(outcome.team), Some(1));
    assert_eq!(feed.mode(), FeedMode::Poll);
}

#[tokio::test]
async fn test_feed_polls_when_service_never_answers() {
    let dir = TempDir::new().unwrap();
    let (addr, silent) = silent_addr().await;
    let agent = ClientSyncAgent::new(test_config(&format!("http://{addr}"), dir.path())).unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Poll).await;
    let snapshot = next_with_total(&mut rx, 0).await;
    assert_eq!(snapshot.len(), 6);

    // Later handshakes time out too, so the feed stays on polling.
    tokio::time::sleep(Duration::from_millis(800)).await;
    assert_eq!(feed.mode(), FeedMode::Poll);
    silent.abort();
}

#[tokio::test]
async fn test_feed_switches_to_push_when_service_comes_up() {
    let dir = TempDir::new().unwrap();
    let addr = closed_addr().await;
    let agent = ClientSyncAgent::new(test_config(&format!("http://{addr}"), dir.path())).unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Poll).await;

    let listener = TcpListener::bind(addr).await.unwrap();
    let server = serve_on(listener, app_state(&dir.path().join("db.json")).await);
    wait_for_mode(&feed, FeedMode::Push).await;
    assert_eq!(server.state.service.broadcaster().observer_count(), 1);

    server.state.service.assign().await.unwrap();
    let snapshot = next_with_total(&mut rx, 1).await;
    assert_eq!(snapshot, server.state.service.counts().await);
    assert_eq!(feed.mode(), FeedMode::Push);
}

#[tokio::test]
async fn test_simulation_feed_only_polls() {
    let dir = TempDir::new().unwrap();
    let server = spawn_server(dir.path()).await;
    let agent = ClientSyncAgent::new(ClientConfig {
        simulation_mode: true,
        ..test_config(&server.base_url(), dir.path())
    })
    .unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Poll).await;
    next_with_total(&mut rx, 0).await;

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(feed.mode(), FeedMode::Poll);
    assert_eq!(server.state.service.broadcaster().observer_count(), 0);
}

#[tokio::test]
async fn test_closed_feed_stops_delivering() {
    let dir = TempDir::new().unwrap();
    let server = spawn_server(dir.path()).await;
    let agent = ClientSyncAgent::new(test_config(&server.base_url(), dir.path())).unwrap();

    let (feed, mut rx) = agent.subscribe();
    wait_for_mode(&feed, FeedMode::Push).await;

    feed.close();
    let drained = tokio::time::timeout(Duration::from_secs(5), async {
        while rx.recv().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());
}
