use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::poll_loop::PollLoop;
use crate::api::DashboardApi;
use crate::config::ClientConfig;
use crate::errors::ClientError;
use crate::events::UiEvent;
use crate::ingestion::push_channel::{push_endpoint, PushChannel};
use crate::render::{ConnectionIndicator, FeedRenderer, RankingsRenderer, StatsRenderer, Surface};

/// The live widgets of the homepage and the surface they draw on. Owned by
/// exactly one task at a time.
#[derive(Debug)]
pub struct LiveView<S> {
    pub feed: FeedRenderer,
    pub rankings: RankingsRenderer,
    pub stats: StatsRenderer,
    pub status: ConnectionIndicator,
    pub surface: S,
}

impl<S: Surface> LiveView<S> {
    pub fn new(surface: S) -> Self {
        Self::with_feed(FeedRenderer::new(), surface)
    }

    pub fn with_feed(feed: FeedRenderer, mut surface: S) -> Self {
        feed.render_empty(&mut surface);
        Self {
            feed,
            rankings: RankingsRenderer::new(),
            stats: StatsRenderer::new(),
            status: ConnectionIndicator::new(),
            surface,
        }
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Trade(trade) => self.feed.push_trade(&trade, &mut self.surface),
            UiEvent::Rankings(rankings) => self.rankings.update(&rankings, &mut self.surface),
            UiEvent::Stats(stats) => self.stats.update(&stats, &mut self.surface),
            UiEvent::Connection(status) => self.status.update(status, &mut self.surface),
        }
    }
}

/// A running homepage: push channel, poll loop and the render task that owns
/// the [`LiveView`].
pub struct Session<S> {
    shutdown: watch::Sender<bool>,
    push: JoinHandle<()>,
    poll: JoinHandle<()>,
    render: JoinHandle<LiveView<S>>,
}

impl<S: Surface + Send + 'static> Session<S> {
    pub fn start(
        config: &ClientConfig,
        api: DashboardApi,
        surface: S,
    ) -> Result<Self, ClientError> {
        Self::with_view(config, api, LiveView::new(surface))
    }

    /// Spawn all tasks around an already-built view. Must be called inside a
    /// tokio runtime.
    pub fn with_view(
        config: &ClientConfig,
        api: DashboardApi,
        view: LiveView<S>,
    ) -> Result<Self, ClientError> {
        let endpoint = push_endpoint(&config.origin)?;
        let (event_tx, event_rx) = mpsc::unbounded_channel::<UiEvent>();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let push = PushChannel::new(endpoint, event_tx.clone(), config.reconnect_delay);
        let poll = PollLoop::new(api, event_tx, config.poll_interval);

        tracing::info!(
            origin = %config.origin,
            poll_ms = config.poll_interval.as_millis() as u64,
            "Starting live session"
        );

        Ok(Self {
            push: tokio::spawn(push.run(shutdown_rx.clone())),
            poll: tokio::spawn(poll.run(shutdown_rx)),
            render: tokio::spawn(render_loop(view, event_rx)),
            shutdown: shutdown_tx,
        })
    }

    /// Stop both producers, let the render task drain what they queued and
    /// hand back the final view. A failed producer is logged; only a failed
    /// render task is an error.
    pub async fn stop(self) -> Result<LiveView<S>, ClientError> {
        // Receivers may already be gone if a producer panicked.
        let _ = self.shutdown.send(true);

        // The render task ends once both senders are dropped, even when a
        // producer panicked.
        let (push, poll) = tokio::join!(self.push, self.poll);
        for (task, res) in [("push", push), ("poll", poll)] {
            if let Err(e) = res {
                tracing::error!(task, error = %e, "Producer task failed");
            }
        }
        let view = self.render.await?;

        tracing::info!(feed_items = view.feed.len(), "Live session stopped");
        Ok(view)
    }
}

/// Apply events strictly in queue order. Ends once every producer has dropped
/// its sender.
async fn render_loop<S: Surface>(
    mut view: LiveView<S>,
    mut rx: mpsc::UnboundedReceiver<UiEvent>,
) -> LiveView<S> {
    while let Some(event) = rx.recv().await {
        tracing::trace!(kind = event.kind(), "Rendering event");
        view.apply(event);
    }
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RankingEntry, TradeEvent};
    use crate::render::{mounts, ConnectionStatus, MemorySurface};
    use chrono::Utc;

    fn trade(n: usize) -> TradeEvent {
        TradeEvent {
            bot_id: "b1".into(),
            bot_name: "Alpha".into(),
            symbol: format!("SYM{n}"),
            side: "buy".into(),
            quantity: 1.0,
            price: 10.0,
            executed_at: Utc::now(),
            reasoning: None,
            total: None,
        }
    }

    #[test]
    fn test_apply_routes_each_event() {
        let mut view = LiveView::new(MemorySurface::new());
        assert!(view.surface.html(mounts::TRADE_FEED).is_some());

        view.apply(UiEvent::Trade(trade(1)));
        view.apply(UiEvent::Connection(ConnectionStatus::Live));
        view.apply(UiEvent::Rankings(vec![RankingEntry {
            bot_id: "b1".into(),
            bot_name: "Alpha".into(),
            pnl: 12.0,
            pnl_percent: 0.01,
            total_value: 100_012.0,
            trade_count: 1,
            rank: Some(1),
            rank_change: None,
            previous_rank: None,
        }]));

        assert_eq!(view.feed.len(), 1);
        assert_eq!(view.status.status(), Some(ConnectionStatus::Live));
        assert_eq!(view.rankings.shown(), 1);
        assert!(view.surface.content(mounts::MINI_LEADERBOARD).unwrap().contains("Alpha"));
    }

    #[tokio::test]
    async fn test_render_loop_keeps_queue_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        for n in 0..3 {
            tx.send(UiEvent::Trade(trade(n))).unwrap();
        }
        drop(tx);

        let view = render_loop(LiveView::new(MemorySurface::new()), rx).await;
        let items: Vec<&str> = view.feed.items().collect();
        assert_eq!(items.len(), 3);
        assert!(items[0].contains("SYM2"));
        assert!(items[2].contains("SYM0"));
    }
}
