#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;

use botboard::{DashboardApi, UiEvent};

const WAIT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Stub HTTP API
// ---------------------------------------------------------------------------

/// Canned responses. `None` / a missing key answers 500.
#[derive(Default)]
pub struct StubData {
    pub leaderboard: Option<Value>,
    pub stats: Option<Value>,
    pub bots: HashMap<String, Value>,
    pub history: HashMap<String, Value>,
}

#[derive(Default)]
pub struct Hits {
    pub leaderboard: AtomicUsize,
    pub stats: AtomicUsize,
    pub bots: AtomicUsize,
    pub history: AtomicUsize,
    /// `"<resource> k=v&k=v"` per request, in arrival order.
    pub requests: Mutex<Vec<String>>,
}

impl Hits {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, resource: &str, query: &HashMap<String, String>) {
        let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        self.requests
            .lock()
            .unwrap()
            .push(format!("{resource} {}", pairs.join("&")));
    }
}

#[derive(Clone)]
struct StubState {
    data: Arc<StubData>,
    hits: Arc<Hits>,
}

pub struct StubApi {
    pub origin: Url,
    pub hits: Arc<Hits>,
}

impl StubApi {
    pub async fn start(data: StubData) -> Self {
        let hits = Arc::new(Hits::default());
        let state = StubState {
            data: Arc::new(data),
            hits: hits.clone(),
        };

        let app = Router::new()
            .route("/api/leaderboard", get(leaderboard_handler))
            .route("/api/stats", get(stats_handler))
            .route("/api/bots/:bot_id", get(bot_detail_handler))
            .route("/api/market/history/:symbol", get(history_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            origin: Url::parse(&format!("http://{addr}")).unwrap(),
            hits,
        }
    }

    pub fn api(&self) -> DashboardApi {
        DashboardApi::new(reqwest::Client::new(), self.origin.clone())
    }
}

async fn leaderboard_handler(
    State(s): State<StubState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    s.hits.leaderboard.fetch_add(1, Ordering::SeqCst);
    s.hits.record("leaderboard", &q);
    let mut body = s
        .data
        .leaderboard
        .clone()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let limit = q.get("limit").and_then(|l| l.parse::<usize>().ok());
    if let (Some(limit), Some(rankings)) = (limit, body["rankings"].as_array_mut()) {
        rankings.truncate(limit);
    }
    Ok(Json(body))
}

async fn stats_handler(State(s): State<StubState>) -> Result<Json<Value>, StatusCode> {
    s.hits.stats.fetch_add(1, Ordering::SeqCst);
    s.hits.record("stats", &HashMap::new());
    s.data
        .stats
        .clone()
        .map(Json)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn bot_detail_handler(
    State(s): State<StubState>,
    Path(bot_id): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    s.hits.bots.fetch_add(1, Ordering::SeqCst);
    s.hits.record(&format!("bots/{bot_id}"), &q);
    s.data
        .bots
        .get(&bot_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn history_handler(
    State(s): State<StubState>,
    Path(symbol): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    s.hits.history.fetch_add(1, Ordering::SeqCst);
    s.hits.record(&format!("history/{symbol}"), &q);
    s.data
        .history
        .get(&symbol)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
}

// ---------------------------------------------------------------------------
// Stub push server
// ---------------------------------------------------------------------------

/// Accepts WebSocket upgrades on any path and hands each connection to the
/// test.
pub struct StubPush {
    pub origin: Url,
    accepted: mpsc::UnboundedReceiver<WebSocketStream<TcpStream>>,
}

impl StubPush {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, accepted) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => {
                        if tx.send(ws).is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("stub push handshake failed: {e}"),
                }
            }
        });

        Self {
            origin: Url::parse(&format!("http://{addr}")).unwrap(),
            accepted,
        }
    }

    pub async fn next_connection(&mut self) -> WebSocketStream<TcpStream> {
        tokio::time::timeout(WAIT, self.accepted.recv())
            .await
            .expect("no push connection within timeout")
            .expect("stub push server stopped")
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<UiEvent>) -> UiEvent {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("no event within timeout")
        .expect("event channel closed")
}

/// Poll `cond` until it holds or the timeout expires.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + WAIT;
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met within timeout");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn ranking(n: usize, pnl_percent: f64) -> Value {
    json!({
        "bot_id": format!("bot-{n}"),
        "bot_name": format!("Bot {n}"),
        "pnl": pnl_percent * 1_000.0,
        "pnl_percent": pnl_percent,
        "total_value": 100_000.0 + pnl_percent * 1_000.0,
        "trade_count": n * 3,
        "rank": n + 1,
    })
}

pub fn leaderboard(count: usize) -> Value {
    let rankings: Vec<Value> = (0..count)
        .map(|n| ranking(n, 12.0 - 3.0 * n as f64))
        .collect();
    json!({ "period": "all_time", "rankings": rankings })
}

pub fn stats() -> Value {
    json!({
        "recent_trades_count": 12,
        "active_bots_count": 1,
        "popular_symbols": [{ "symbol": "NVDA", "trade_count": 9, "bot_count": 4 }],
        "biggest_gainer": { "bot_id": "bot-0", "bot_name": "Bot 0", "pnl_percent": 12.04 },
        "biggest_loser": null,
    })
}

pub fn bot_detail(name: &str, total_value: f64, snapshots: &[(DateTime<Utc>, f64)]) -> Value {
    let snapshots: Vec<Value> = snapshots
        .iter()
        .map(|(at, value)| json!({ "snapshot_at": at, "total_value": value }))
        .collect();
    json!({
        "name": name,
        "portfolio": {
            "total_value": total_value,
            "total_pnl_percent": (total_value - 100_000.0) / 1_000.0,
            "positions": [
                { "symbol": "AAPL", "market_value": 40_000.0, "unrealized_pnl": 1_200.0, "quantity": 200.0 },
                { "symbol": "TSLA", "market_value": 10_000.0, "unrealized_pnl": -300.0 },
            ],
        },
        "portfolio_snapshots": snapshots,
        "recent_trades": [
            { "symbol": "AAPL", "side": "buy", "quantity": 200, "price": 194.0, "executed_at": "2026-10-01T14:00:00Z" },
        ],
    })
}

pub fn trade_envelope(symbol: &str, side: &str, quantity: f64) -> String {
    json!({
        "event": "trade",
        "data": {
            "bot_id": "b1",
            "bot_name": "Alpha",
            "symbol": symbol,
            "side": side,
            "quantity": quantity,
            "price": 10.0,
        },
    })
    .to_string()
}
