use std::time::Duration;

use metrics::counter;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::api::DashboardApi;
use crate::events::{EventSink, UiEvent};
use crate::render::rankings::MINI_LEADERBOARD_ROWS;

/// `tokio::time::interval` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Periodic refresh of the mini leaderboard and the aggregate stats.
pub struct PollLoop<S> {
    api: DashboardApi,
    sink: S,
    period: Duration,
}

impl<S: EventSink> PollLoop<S> {
    pub fn new(api: DashboardApi, sink: S, period: Duration) -> Self {
        Self {
            api,
            sink,
            period: period.max(MIN_PERIOD),
        }
    }

    /// First cycle runs immediately. A failed cycle is logged and skipped;
    /// previously delivered data stays on screen.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            tokio::select! {
                _ = self.poll_once() => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!("Poll loop stopped");
    }

    /// Fetch rankings and stats concurrently and deliver whatever succeeded.
    pub async fn poll_once(&self) {
        let (rankings, stats) = tokio::join!(
            self.api.leaderboard(MINI_LEADERBOARD_ROWS),
            self.api.stats(),
        );

        match rankings {
            Ok(rankings) => {
                tracing::debug!(count = rankings.len(), "Rankings refreshed");
                self.sink.deliver(UiEvent::Rankings(rankings));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh rankings");
                counter!("poll_failures_total", "resource" => "leaderboard").increment(1);
            }
        }

        match stats {
            Ok(stats) => self.sink.deliver(UiEvent::Stats(stats)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh stats");
                counter!("poll_failures_total", "resource" => "stats").increment(1);
            }
        }
    }
}
