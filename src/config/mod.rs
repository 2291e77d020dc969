use reqwest::Url;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::errors::ClientError;
use crate::timescale::TimeScale;

const DEFAULT_ORIGIN: &str = "http://localhost:8080";
const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Page origin; the HTTP API and the push endpoint hang off it.
    pub origin: Url,
    pub poll_interval: Duration,
    pub reconnect_delay: Duration,
    pub time_scale: TimeScale,

    // Observability
    pub log_json: bool,
    pub metrics_addr: Option<SocketAddr>,
}

impl ClientConfig {
    /// Defaults for everything but the origin.
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            time_scale: TimeScale::default(),
            log_json: false,
            metrics_addr: None,
        }
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any name → value source; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let origin_raw = var("DASHBOARD_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.into());
        let origin = Url::parse(&origin_raw)
            .map_err(|e| ClientError::Config(format!("DASHBOARD_ORIGIN {origin_raw:?}: {e}")))?;

        let time_scale: TimeScale = match var("DASHBOARD_TIME_SCALE") {
            Some(raw) => raw
                .parse()
                .map_err(|e| ClientError::Config(format!("DASHBOARD_TIME_SCALE: {e}")))?,
            None => TimeScale::default(),
        };

        let metrics_addr: Option<SocketAddr> = match var("METRICS_ADDR") {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .map_err(|e| ClientError::Config(format!("METRICS_ADDR {raw:?}: {e}")))?,
            ),
            _ => None,
        };

        let poll_ms = millis_var(&var, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        if poll_ms == 0 {
            return Err(ClientError::Config("POLL_INTERVAL_MS must be positive".into()));
        }
        let reconnect_ms = millis_var(&var, "RECONNECT_DELAY_MS", DEFAULT_RECONNECT_DELAY_MS)?;

        Ok(Self {
            origin,
            poll_interval: Duration::from_millis(poll_ms),
            reconnect_delay: Duration::from_millis(reconnect_ms),
            time_scale,
            log_json: var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
            metrics_addr,
        })
    }
}

fn millis_var(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: u64,
) -> Result<u64, ClientError> {
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ClientError::Config(format!("{name} {raw:?}: {e}"))),
        None => Ok(default),
    }
}
