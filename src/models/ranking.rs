use serde::{Deserialize, Serialize};

/// One row of the leaderboard. Collections of these arrive already ordered by
/// descending performance; the client never re-sorts them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub bot_id: String,
    pub bot_name: String,
    #[serde(default)]
    pub pnl: f64,
    #[serde(default)]
    pub pnl_percent: f64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub trade_count: u64,
    #[serde(default)]
    pub rank: Option<u32>,
    /// Positive when the bot moved up since the previous period.
    #[serde(default)]
    pub rank_change: Option<i32>,
    #[serde(default)]
    pub previous_rank: Option<u32>,
}

impl RankingEntry {
    pub fn is_gaining(&self) -> bool {
        self.pnl_percent >= 0.0
    }
}
