//! Server push over the service's event stream.
//!
//! The stream is `text/event-stream`. Each event carries the full counter
//! state as JSON in its `data`. Keep-alive comments and events that do
//! not decode are skipped.
//!
//! Getting the response headers is bounded by the handshake timeout. The
//! open stream is not. A connection that fails or ends is reported and
//! retried after the reconnect delay, until the channel is closed.

use std::time::Duration;

use eventsource_stream::{Event, Eventsource};
use futures::StreamExt;
use huddle_types::CounterState;
use tracing::{debug, info, warn};

use super::{ChannelEvent, ChannelHandle, ChannelKind, EventSender, Emitter, SnapshotSource};
use crate::error::ClientError;

/// Subscribes to `GET /events` and reconnects on its own.
#[derive(Debug, Clone)]
pub struct PushChannel {
    client: reqwest::Client,
    url: String,
    handshake_timeout: Duration,
    reconnect_delay: Duration,
}

impl PushChannel {
    /// Stream snapshots from `url`.
    ///
    /// A connection attempt that has no response headers after
    /// `handshake_timeout` counts as failed. Attempts are spaced by
    /// `reconnect_delay`.
    pub const fn new(
        client: reqwest::Client,
        url: String,
        handshake_timeout: Duration,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            client,
            url,
            handshake_timeout,
            reconnect_delay,
        }
    }
}

impl SnapshotSource for PushChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Push
    }

    fn open(&self, events: EventSender) -> ChannelHandle {
        let emitter = Emitter::new(ChannelKind::Push, events);
        let channel = self.clone();
        let task = tokio::spawn(async move { channel.run(&emitter).await });
        ChannelHandle::new(ChannelKind::Push, task)
    }
}

impl PushChannel {
    async fn run(self, emitter: &Emitter) {
        loop {
            let event = match self.connect(emitter).await {
                Ok(()) => {
                    info!(url = %self.url, "Event stream ended");
                    ChannelEvent::Closed
                }
                Err(e) => {
                    warn!(url = %self.url, error = %e, "Event stream failed");
                    ChannelEvent::Error(e.to_string())
                }
            };
            if !emitter.emit(event) {
                return;
            }
            tokio::time::sleep(self.reconnect_delay).await;
            if emitter.is_closed() {
                return;
            }
        }
    }

    /// One connection: open, forward snapshots until the stream ends.
    async fn connect(&self, emitter: &Emitter) -> Result<(), ClientError> {
        let request = self
            .client
            .get(&self.url)
            .header("Accept", "text/event-stream")
            .send();
        let response = match tokio::time::timeout(self.handshake_timeout, request).await {
            Ok(sent) => sent.map_err(|e| ClientError::Channel(format!("connect failed: {e}")))?,
            Err(elapsed) => {
                debug!(url = %self.url, error = %elapsed, "Event stream handshake timed out");
                return Err(ClientError::Timeout(self.handshake_timeout));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        debug!(url = %self.url, "Event stream open");
        if !emitter.emit(ChannelEvent::Open) {
            return Ok(());
        }

        let mut events = std::pin::pin!(response.bytes_stream().eventsource());
        while let Some(event) = events.next().await {
            let event = event.map_err(|e| ClientError::Channel(format!("stream read failed: {e}")))?;
            let Some(snapshot) = snapshot_from(&event) else {
                continue;
            };
            if !emitter.emit(ChannelEvent::Snapshot(snapshot)) {
                return Ok(());
            }
        }
        Ok(())
    }
}

/// Decode the counter state carried by `event`, if any.
fn snapshot_from(event: &Event) -> Option<CounterState> {
    if event.data.is_empty() {
        return None;
    }
    match serde_json::from_str(&event.data) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            debug!(error = %e, event = %event.event, "Skipping unparsable event");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::stream;

    use super::*;

    async fn decode(chunks: &[&'static [u8]]) -> Vec<Event> {
        stream::iter(chunks.iter().copied().map(Ok::<_, std::io::Error>))
            .eventsource()
            .map(Result::unwrap)
            .collect()
            .await
    }

    #[tokio::test]
    async fn decodes_snapshots_split_across_chunks() {
        let events = decode(&[b"data: {\"bl", b"ue\":3}\n", b"\ndata: {\"red\":1}\n\n"]).await;
        let snapshots: Vec<CounterState> = events.iter().filter_map(snapshot_from).collect();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots.first().unwrap().total(), 3);
        assert_eq!(snapshots.last().unwrap().total(), 1);
    }

    #[tokio::test]
    async fn skips_keep_alives_and_handles_crlf() {
        let events = decode(&[b": keep-alive\r\n\r\ndata:{\"green\":2}\r\n\r\n"]).await;
        let snapshots: Vec<CounterState> = events.iter().filter_map(snapshot_from).collect();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots.first().unwrap().total(), 2);
    }

    #[tokio::test]
    async fn joins_multi_line_data() {
        let events = decode(&[b"event: counts\ndata: {\ndata: \"red\": 4}\n\n"]).await;
        let event = events.first().unwrap();
        assert_eq!(event.event, "counts");
        assert_eq!(snapshot_from(event).unwrap().total(), 4);
    }

    #[tokio::test]
    async fn unparsable_data_is_skipped() {
        let events = decode(&[b"data: not json\n\ndata: {\"pink\":1}\n\n"]).await;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|event| snapshot_from(event).is_none()));
    }
}
