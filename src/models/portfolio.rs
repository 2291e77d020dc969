use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TradeEvent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub snapshot_at: DateTime<Utc>,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub symbol: String,
    #[serde(default)]
    pub market_value: f64,
    #[serde(default)]
    pub unrealized_pnl: f64,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub total_pnl_percent: f64,
    #[serde(default)]
    pub positions: Vec<PositionEntry>,
}

impl Portfolio {
    /// Up to `n` positions ordered by descending market value.
    pub fn top_holdings(&self, n: usize) -> Vec<&PositionEntry> {
        let mut sorted: Vec<&PositionEntry> = self.positions.iter().collect();
        sorted.sort_by(|a, b| b.market_value.total_cmp(&a.market_value));
        sorted.truncate(n);
        sorted
    }
}

/// Response of `GET /api/bots/{bot_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub portfolio: Portfolio,
    #[serde(default)]
    pub portfolio_snapshots: Vec<PortfolioSnapshot>,
    /// Newest first.
    #[serde(default)]
    pub recent_trades: Vec<TradeEvent>,
}
