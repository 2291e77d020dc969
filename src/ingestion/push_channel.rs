use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use reqwest::Url;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::api::ws_types::{Envelope, LeaderboardUpdate, LEADERBOARD_UPDATE_EVENT, TRADE_EVENT};
use crate::errors::ClientError;
use crate::events::{EventSink, UiEvent};
use crate::models::TradeEvent;
use crate::render::ConnectionStatus;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3_000);

/// Push endpoint for a page origin: `http → ws`, `https → wss`, path `/ws`.
pub fn push_endpoint(origin: &Url) -> Result<Url, ClientError> {
    let scheme = match origin.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(ClientError::InvalidUrl(format!("unsupported scheme {other}"))),
    };
    let mut url = origin.clone();
    url.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidUrl(origin.to_string()))?;
    url.set_path("/ws");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

// ---------------------------------------------------------------------------
// Connection state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

/// Transport-free push channel lifecycle. The driver reports what the socket
/// did; the core decides what to surface and when to dial again.
#[derive(Debug)]
pub struct ChannelCore {
    state: ChannelState,
    reconnect_at: Option<Instant>,
    reconnect_delay: Duration,
    torn_down: bool,
}

impl ChannelCore {
    pub fn new(reconnect_delay: Duration) -> Self {
        Self {
            state: ChannelState::Disconnected,
            reconnect_at: None,
            reconnect_delay,
            torn_down: false,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn is_stopped(&self) -> bool {
        self.torn_down
    }

    /// Pending reconnect, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        self.reconnect_at
    }

    /// Start dialing. Returns false when there is nothing to do: already
    /// connecting or connected, or torn down.
    pub fn connect(&mut self) -> bool {
        if self.torn_down || self.state != ChannelState::Disconnected {
            return false;
        }
        self.state = ChannelState::Connecting;
        self.reconnect_at = None;
        true
    }

    pub fn opened(&mut self) -> Option<ConnectionStatus> {
        if self.torn_down {
            return None;
        }
        self.state = ChannelState::Connected;
        self.reconnect_at = None;
        Some(ConnectionStatus::Live)
    }

    /// Errors only surface; the close that follows drives the transition.
    pub fn errored(&mut self) -> Option<ConnectionStatus> {
        if self.torn_down {
            return None;
        }
        Some(ConnectionStatus::Disconnected)
    }

    /// Schedule exactly one reconnect at `now + delay`, replacing any pending one.
    pub fn closed(&mut self, now: Instant) -> Option<ConnectionStatus> {
        if self.torn_down {
            return None;
        }
        self.state = ChannelState::Disconnected;
        self.reconnect_at = Some(now + self.reconnect_delay);
        Some(ConnectionStatus::Disconnected)
    }

    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.reconnect_at = None;
        self.state = ChannelState::Disconnected;
    }
}

// ---------------------------------------------------------------------------
// Envelope dispatch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Delivered,
    Ignored,
    Malformed,
}

/// Decode one text frame and hand the payload to `sink`. Nothing here can
/// fail the channel: bad frames are logged and dropped.
pub fn dispatch<S: EventSink + ?Sized>(text: &str, sink: &S) -> Dispatch {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(error = %e, raw = %text, "Unparseable push message dropped");
            counter!("push_dropped_messages_total").increment(1);
            return Dispatch::Malformed;
        }
    };

    let event = match envelope.event.as_str() {
        TRADE_EVENT => serde_json::from_value::<TradeEvent>(envelope.data).map(UiEvent::Trade),
        LEADERBOARD_UPDATE_EVENT => serde_json::from_value::<LeaderboardUpdate>(envelope.data)
            .map(|update| UiEvent::Rankings(update.rankings)),
        other => {
            tracing::debug!(event = other, "Unknown push event ignored");
            counter!("push_messages_total", "event" => "unknown").increment(1);
            return Dispatch::Ignored;
        }
    };

    match event {
        Ok(event) => {
            counter!("push_messages_total", "event" => envelope.event).increment(1);
            sink.deliver(event);
            Dispatch::Delivered
        }
        Err(e) => {
            tracing::warn!(event = %envelope.event, error = %e, "Malformed push payload dropped");
            counter!("push_dropped_messages_total").increment(1);
            Dispatch::Malformed
        }
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

enum SessionEnd {
    Closed,
    Errored,
    Shutdown,
}

/// Single live connection to the push endpoint with fixed-delay reconnect.
pub struct PushChannel<S> {
    endpoint: Url,
    sink: S,
    core: ChannelCore,
}

impl<S: EventSink> PushChannel<S> {
    pub fn new(endpoint: Url, sink: S, reconnect_delay: Duration) -> Self {
        Self {
            endpoint,
            sink,
            core: ChannelCore::new(reconnect_delay),
        }
    }

    /// Run until `shutdown` flips (or its sender is dropped). Never returns
    /// early on transport errors.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Some(deadline) = self.core.deadline() {
                tracing::info!(
                    delay_ms = self.core.reconnect_delay.as_millis() as u64,
                    "Reconnecting to push channel..."
                );
                tokio::select! {
                    _ = sleep_until(deadline) => {}
                    _ = shutdown.changed() => break,
                }
                counter!("push_reconnects_total").increment(1);
            }

            if !self.core.connect() {
                break;
            }

            tracing::info!(url = %self.endpoint, "Connecting to push channel...");
            let connected = tokio::select! {
                res = connect_async(self.endpoint.as_str()) => res,
                _ = shutdown.changed() => break,
            };

            let end = match connected {
                Ok((ws_stream, _response)) => {
                    tracing::info!(url = %self.endpoint, "Push channel connected");
                    let status = self.core.opened();
                    self.surface(status);
                    gauge!("push_connected").set(1.0);
                    self.pump(ws_stream, &mut shutdown).await
                }
                Err(e) => {
                    tracing::error!(error = %e, "Push channel connection failed");
                    SessionEnd::Errored
                }
            };
            gauge!("push_connected").set(0.0);

            match end {
                SessionEnd::Shutdown => break,
                SessionEnd::Errored => {
                    let status = self.core.errored();
                    self.surface(status);
                }
                SessionEnd::Closed => {}
            }
            let status = self.core.closed(Instant::now());
            self.surface(status);
        }

        self.core.teardown();
        gauge!("push_connected").set(0.0);
        tracing::info!("Push channel stopped");
    }

    async fn pump<T>(
        &mut self,
        ws_stream: tokio_tungstenite::WebSocketStream<T>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> SessionEnd
    where
        T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            dispatch(text.as_str(), &self.sink);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = write.send(Message::Pong(data)).await {
                                tracing::warn!(error = %e, "Failed to send pong");
                                return SessionEnd::Errored;
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::warn!("Push server sent close frame");
                            return SessionEnd::Closed;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Push channel read error");
                            return SessionEnd::Errored;
                        }
                        None => {
                            tracing::warn!("Push channel stream ended");
                            return SessionEnd::Closed;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if let Err(e) = write.send(Message::Close(None)).await {
                        tracing::debug!(error = %e, "Close frame not sent");
                    }
                    return SessionEnd::Shutdown;
                }
            }
        }
    }

    fn surface(&self, status: Option<ConnectionStatus>) {
        if let Some(status) = status {
            self.sink.deliver(UiEvent::Connection(status));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<UiEvent>>);

    impl EventSink for Collect {
        fn deliver(&self, event: UiEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_push_endpoint_schemes() {
        let http = Url::parse("http://localhost:8080/index.html?x=1").unwrap();
        assert_eq!(push_endpoint(&http).unwrap().as_str(), "ws://localhost:8080/ws");
        let https = Url::parse("https://board.example.com").unwrap();
        assert_eq!(push_endpoint(&https).unwrap().as_str(), "wss://board.example.com/ws");
        let ftp = Url::parse("ftp://example.com").unwrap();
        assert!(push_endpoint(&ftp).is_err());
    }

    #[test]
    fn test_close_schedules_single_reconnect() {
        let mut core = ChannelCore::new(DEFAULT_RECONNECT_DELAY);
        assert!(core.connect());
        assert!(!core.connect());
        assert_eq!(core.opened(), Some(ConnectionStatus::Live));
        assert_eq!(core.state(), ChannelState::Connected);

        let t0 = Instant::now();
        assert_eq!(core.closed(t0), Some(ConnectionStatus::Disconnected));
        assert_eq!(core.deadline(), Some(t0 + DEFAULT_RECONNECT_DELAY));

        // A second close replaces the pending reconnect rather than adding one.
        let t1 = t0 + Duration::from_millis(500);
        core.closed(t1);
        assert_eq!(core.deadline(), Some(t1 + DEFAULT_RECONNECT_DELAY));

        assert!(core.connect());
        assert_eq!(core.deadline(), None);
        assert_eq!(core.opened(), Some(ConnectionStatus::Live));
    }

    #[test]
    fn test_error_does_not_transition() {
        let mut core = ChannelCore::new(DEFAULT_RECONNECT_DELAY);
        core.connect();
        core.opened();
        assert_eq!(core.errored(), Some(ConnectionStatus::Disconnected));
        assert_eq!(core.state(), ChannelState::Connected);
        assert_eq!(core.deadline(), None);
    }

    #[test]
    fn test_teardown_is_terminal() {
        let mut core = ChannelCore::new(DEFAULT_RECONNECT_DELAY);
        core.connect();
        core.closed(Instant::now());
        core.teardown();
        assert!(core.is_stopped());
        assert_eq!(core.deadline(), None);
        assert!(!core.connect());
        assert_eq!(core.opened(), None);
        assert_eq!(core.closed(Instant::now()), None);
        assert_eq!(core.deadline(), None);
    }

    #[test]
    fn test_dispatch_trade_and_leaderboard() {
        let sink = Collect::default();
        let trade = r#"{"event":"trade","data":{"bot_id":"b1","bot_name":"Alpha","symbol":"AAPL","side":"buy","quantity":10,"price":190.5}}"#;
        assert_eq!(dispatch(trade, &sink), Dispatch::Delivered);

        let board = r#"{"event":"leaderboard_update","data":{"rankings":[{"bot_id":"b1","bot_name":"Alpha","pnl":1.0,"pnl_percent":0.1,"total_value":100001.0,"trade_count":4}]}}"#;
        assert_eq!(dispatch(board, &sink), Dispatch::Delivered);

        let events = sink.0.lock().unwrap();
        assert!(matches!(
            &events[0],
            UiEvent::Trade(t) if t.symbol == "AAPL" && t.quantity == 10.0
        ));
        assert!(matches!(&events[1], UiEvent::Rankings(r) if r.len() == 1 && r[0].bot_id == "b1"));
    }

    #[test]
    fn test_dispatch_drops_bad_frames() {
        let sink = Collect::default();
        assert_eq!(dispatch("not json", &sink), Dispatch::Malformed);
        assert_eq!(
            dispatch(r#"{"event":"trade","data":{"symbol":"AAPL"}}"#, &sink),
            Dispatch::Malformed
        );
        assert_eq!(dispatch(r#"{"event":"heartbeat","data":{}}"#, &sink), Dispatch::Ignored);
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
