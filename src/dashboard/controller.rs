use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;

use crate::api::DashboardApi;
use crate::charts::{
    create_leaderboard_bar_chart, create_portfolio_mini_chart, ChartBackend, ChartSlot,
};
use crate::errors::ClientError;
use crate::models::{BotDetail, RankingEntry};
use crate::render::cards::{
    render_card, BOT_DATA_FAILED_HTML, BOT_DATA_LOADING_HTML, NO_BOT_DATA_HTML,
};
use crate::render::{mounts, Surface};
use crate::timescale::TimeScale;

/// Bots fetched for the leaderboard chart.
pub const DASHBOARD_LEADERBOARD_LIMIT: usize = 8;
/// Bots that get a card with a mini chart.
pub const DASHBOARD_BOT_CARDS_COUNT: usize = 6;
/// Trades requested per bot detail, enough to rebuild a value history.
pub const BOT_DETAIL_TRADE_LIMIT: usize = 200;

const LEADERBOARD_LOADING_HTML: &str =
    r#"<div class="chart-wrapper"><div class="chart-loading">Loading leaderboard...</div></div>"#;
const LEADERBOARD_FAILED_HTML: &str =
    r#"<div class="chart-wrapper"><p class="text-muted p-24">Failed to load leaderboard.</p></div>"#;

fn leaderboard_canvas_html() -> String {
    format!(
        r#"<div class="chart-wrapper"><canvas id="{}"></canvas></div>"#,
        mounts::DASHBOARD_LEADERBOARD_CHART
    )
}

/// How far [`DashboardController::activate`] got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardLoad {
    /// Leaderboard chart and `cards` bot cards rendered.
    Loaded { cards: usize },
    NoBots,
    LeaderboardFailed,
    DetailsFailed,
}

/// Homepage composition: leaderboard bar chart plus one card and mini chart
/// per top bot, with a time-scale selector that re-renders from cache.
pub struct DashboardController<S> {
    api: DashboardApi,
    charts: Option<Arc<dyn ChartBackend>>,
    surface: S,
    time_scale: TimeScale,
    leaderboard_chart: ChartSlot,
    mini_charts: Vec<ChartSlot>,
    cached: Vec<(RankingEntry, BotDetail)>,
}

impl<S: Surface> DashboardController<S> {
    /// `charts` is `None` when no chart library is available; the markup is
    /// still rendered.
    pub fn new(
        api: DashboardApi,
        charts: Option<Arc<dyn ChartBackend>>,
        surface: S,
        time_scale: TimeScale,
    ) -> Self {
        Self {
            api,
            charts,
            surface,
            time_scale,
            leaderboard_chart: ChartSlot::new(),
            mini_charts: Vec::new(),
            cached: Vec::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(mut self) -> S {
        self.teardown();
        let Self { surface, .. } = self;
        surface
    }

    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    /// Bot details from the last successful load, in card order.
    pub fn cached_details(&self) -> impl Iterator<Item = &BotDetail> {
        self.cached.iter().map(|(_, detail)| detail)
    }

    pub async fn activate(&mut self) -> DashboardLoad {
        self.surface
            .set_html(mounts::DASHBOARD_LEADERBOARD, LEADERBOARD_LOADING_HTML.to_string());

        let rankings = match self.api.leaderboard(DASHBOARD_LEADERBOARD_LIMIT).await {
            Ok(rankings) => rankings,
            Err(e) => {
                tracing::error!(error = %e, "Dashboard leaderboard load failed");
                self.surface
                    .set_html(mounts::DASHBOARD_LEADERBOARD, LEADERBOARD_FAILED_HTML.to_string());
                self.surface
                    .set_html(mounts::DASHBOARD_BOT_CARDS, BOT_DATA_FAILED_HTML.to_string());
                return DashboardLoad::LeaderboardFailed;
            }
        };

        self.surface
            .set_html(mounts::DASHBOARD_LEADERBOARD, leaderboard_canvas_html());
        self.render_leaderboard_chart(&rankings);

        if rankings.is_empty() {
            self.surface
                .set_html(mounts::DASHBOARD_BOT_CARDS, NO_BOT_DATA_HTML.to_string());
            return DashboardLoad::NoBots;
        }

        self.surface
            .set_html(mounts::DASHBOARD_BOT_CARDS, BOT_DATA_LOADING_HTML.to_string());

        let top: Vec<RankingEntry> = rankings
            .into_iter()
            .take(DASHBOARD_BOT_CARDS_COUNT)
            .collect();
        let details = match self.fetch_details(&top).await {
            Ok(details) => details,
            Err(e) => {
                tracing::error!(error = %e, "Dashboard bot details load failed");
                self.surface
                    .set_html(mounts::DASHBOARD_BOT_CARDS, BOT_DATA_FAILED_HTML.to_string());
                return DashboardLoad::DetailsFailed;
            }
        };

        self.cached = top.into_iter().zip(details).collect();
        self.render_cards();
        self.render_mini_charts(Utc::now());

        tracing::info!(cards = self.cached.len(), "Dashboard loaded");
        DashboardLoad::Loaded {
            cards: self.cached.len(),
        }
    }

    /// Switch the mini-chart range and redraw every card chart from the
    /// cached details. No network traffic.
    pub fn select_time_scale(&mut self, scale: TimeScale) {
        self.select_time_scale_at(scale, Utc::now());
    }

    pub fn select_time_scale_at(&mut self, scale: TimeScale, now: DateTime<Utc>) {
        tracing::debug!(scale = %scale, "Time scale selected");
        self.time_scale = scale;
        self.render_mini_charts(now);
    }

    /// Destroy every chart instance this controller created.
    pub fn teardown(&mut self) {
        self.leaderboard_chart.clear();
        for slot in &mut self.mini_charts {
            slot.clear();
        }
        self.mini_charts.clear();
    }

    /// All-or-nothing: one failed detail fails the stage.
    async fn fetch_details(&self, top: &[RankingEntry]) -> Result<Vec<BotDetail>, ClientError> {
        try_join_all(
            top.iter()
                .map(|entry| self.api.bot_detail(&entry.bot_id, BOT_DETAIL_TRADE_LIMIT)),
        )
        .await
    }

    fn render_leaderboard_chart(&mut self, rankings: &[RankingEntry]) {
        self.leaderboard_chart.clear();
        let Some(backend) = &self.charts else {
            return;
        };
        match create_leaderboard_bar_chart(backend, mounts::DASHBOARD_LEADERBOARD_CHART, rankings) {
            Ok(handle) => self.leaderboard_chart.set(handle),
            Err(e) => tracing::warn!(error = %e, "Leaderboard chart not rendered"),
        }
    }

    fn render_cards(&mut self) {
        let html: String = self
            .cached
            .iter()
            .enumerate()
            .map(|(i, (entry, detail))| render_card(i, entry, detail))
            .collect();
        self.surface.set_html(mounts::DASHBOARD_BOT_CARDS, html);
    }

    fn render_mini_charts(&mut self, now: DateTime<Utc>) {
        for slot in &mut self.mini_charts {
            slot.clear();
        }
        self.mini_charts.clear();

        let Some(backend) = &self.charts else {
            return;
        };
        for (i, (_, detail)) in self.cached.iter().enumerate() {
            let mut slot = ChartSlot::new();
            match create_portfolio_mini_chart(
                backend,
                &mounts::bot_card_chart(i),
                &detail.portfolio_snapshots,
                &detail.recent_trades,
                detail.portfolio.total_value,
                self.time_scale,
                now,
            ) {
                Ok(handle) => slot.set(Some(handle)),
                Err(e) => tracing::warn!(card = i, error = %e, "Mini chart not rendered"),
            }
            self.mini_charts.push(slot);
        }
    }
}
