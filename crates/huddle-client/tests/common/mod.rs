//! Shared helpers for the client integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use huddle_client::{ClientConfig, FeedMode, LiveFeed};
use huddle_core::Roster;
use huddle_server::{AppState, AssignmentService};
use huddle_store::CounterStore;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A running service on a loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
    task: JoinHandle<()>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn app_state(store_path: &Path) -> Arc<AppState> {
    let store = CounterStore::open(store_path, Roster::default()).await.unwrap();
    Arc::new(AppState::new(AssignmentService::new(Arc::new(store)).await))
}

pub fn serve_on(listener: TcpListener, state: Arc<AppState>) -> TestServer {
    let addr = listener.local_addr().unwrap();
    let served = Arc::clone(&state);
    let task = tokio::spawn(async move {
        huddle_server::serve(listener, served, std::future::pending())
            .await
            .unwrap();
    });
    TestServer { addr, state, task }
}

pub async fn spawn_server(dir: &Path) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    serve_on(listener, app_state(&dir.join("db.json")).await)
}

/// An address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// An address that accepts connections and never answers. The listener
/// lives as long as the returned task.
pub async fn silent_addr() -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    (addr, task)
}

/// Short timings so the fallback paths run quickly.
pub fn test_config(base_url: &str, dir: &Path) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_owned(),
        request_timeout: Duration::from_millis(300),
        fallback_delay: Duration::from_millis(50),
        poll_interval: Duration::from_millis(50),
        reconnect_delay: Duration::from_millis(100),
        state_dir: dir.join("kiosk"),
        ..ClientConfig::default()
    }
}

pub async fn wait_for_mode(feed: &LiveFeed, mode: FeedMode) {
    let mut watch = feed.watch_mode();
    tokio::time::timeout(Duration::from_secs(5), watch.wait_for(|m| *m == mode))
        .await
        .unwrap()
        .unwrap();
}
