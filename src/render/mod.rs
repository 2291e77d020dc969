pub mod cards;
pub mod feed;
pub mod format;
pub mod rankings;
pub mod stats;
pub mod status;

pub use feed::FeedRenderer;
pub use rankings::RankingsRenderer;
pub use stats::StatsRenderer;
pub use status::{ConnectionIndicator, ConnectionStatus};

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Mount points
// ---------------------------------------------------------------------------

pub mod mounts {
    pub const TRADE_FEED: &str = "trade-feed";
    pub const MINI_LEADERBOARD: &str = "mini-leaderboard";
    pub const STAT_RECENT_TRADES: &str = "stat-recent-trades";
    pub const STAT_ACTIVE_BOTS: &str = "stat-active-bots";
    pub const STAT_POPULAR_SYMBOL: &str = "stat-popular-symbol";
    pub const STAT_BIGGEST_GAINER: &str = "stat-biggest-gainer";
    pub const CONNECTION_STATUS: &str = "connection-status";
    pub const DASHBOARD_LEADERBOARD: &str = "dashboard-leaderboard";
    pub const DASHBOARD_LEADERBOARD_CHART: &str = "dashboard-leaderboard-chart";
    pub const DASHBOARD_BOT_CARDS: &str = "dashboard-bot-cards";
    pub const CANDLESTICK_CHART: &str = "candlestick-chart";

    /// Canvas of the `index`-th dashboard bot card.
    pub fn bot_card_chart(index: usize) -> String {
        format!("dashboard-bot-chart-{index}")
    }
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// Display sink addressed by mount-point id. Each mount is written by exactly
/// one renderer; a write replaces the previous content of that mount.
pub trait Surface {
    /// Replace the mount's content with plain text.
    fn set_text(&mut self, mount: &str, text: String);

    /// Replace the mount's content with already-escaped markup.
    fn set_html(&mut self, mount: &str, html: String);
}

#[derive(Debug, Clone, PartialEq)]
pub enum MountContent {
    Text(String),
    Html(String),
}

impl MountContent {
    pub fn as_str(&self) -> &str {
        match self {
            MountContent::Text(s) | MountContent::Html(s) => s,
        }
    }
}

/// Surface that keeps the latest content of every mount in memory.
#[derive(Debug, Default)]
pub struct MemorySurface {
    mounts: HashMap<String, MountContent>,
    writes: u64,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, mount: &str) -> Option<&MountContent> {
        self.mounts.get(mount)
    }

    /// Current content of a mount, text or markup.
    pub fn content(&self, mount: &str) -> Option<&str> {
        self.mounts.get(mount).map(MountContent::as_str)
    }

    pub fn text(&self, mount: &str) -> Option<&str> {
        match self.mounts.get(mount) {
            Some(MountContent::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn html(&self, mount: &str) -> Option<&str> {
        match self.mounts.get(mount) {
            Some(MountContent::Html(s)) => Some(s),
            _ => None,
        }
    }

    /// Total number of writes across all mounts.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Surface for MemorySurface {
    fn set_text(&mut self, mount: &str, text: String) {
        self.writes += 1;
        self.mounts.insert(mount.to_string(), MountContent::Text(text));
    }

    fn set_html(&mut self, mount: &str, html: String) {
        self.writes += 1;
        self.mounts.insert(mount.to_string(), MountContent::Html(html));
    }
}

/// Memory surface that also traces every write, used by the headless runner.
#[derive(Debug, Default)]
pub struct LoggingSurface {
    inner: MemorySurface,
}

impl LoggingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemorySurface {
        &self.inner
    }
}

impl Surface for LoggingSurface {
    fn set_text(&mut self, mount: &str, text: String) {
        tracing::info!(mount, text = %text, "Surface text updated");
        self.inner.set_text(mount, text);
    }

    fn set_html(&mut self, mount: &str, html: String) {
        tracing::debug!(mount, bytes = html.len(), "Surface markup updated");
        self.inner.set_html(mount, html);
    }
}
