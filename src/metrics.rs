use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Register the client's metrics and, when `listen` is set, serve them on a
/// Prometheus scrape endpoint. Must run inside a tokio runtime.
pub fn init_metrics(listen: Option<SocketAddr>) -> Result<(), BuildError> {
    if let Some(addr) = listen {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        tracing::info!(addr = %addr, "Prometheus exporter listening");
    }

    describe_counter!("push_messages_total", "Push envelopes decoded, by event tag");
    describe_counter!("push_dropped_messages_total", "Push frames dropped as malformed");
    describe_counter!("push_reconnects_total", "Push channel reconnect attempts");
    describe_gauge!("push_connected", "1 while the push channel is open");
    describe_counter!("poll_failures_total", "Failed poll requests, by resource");
    describe_counter!("feed_trades_total", "Trades rendered into the live feed");

    // Pre-register so they appear before the first increment.
    counter!("push_dropped_messages_total").absolute(0);
    counter!("push_reconnects_total").absolute(0);
    counter!("feed_trades_total").absolute(0);
    gauge!("push_connected").set(0.0);

    Ok(())
}
