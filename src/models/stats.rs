use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularSymbol {
    pub symbol: String,
    #[serde(default)]
    pub trade_count: u64,
    #[serde(default)]
    pub bot_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotGainer {
    pub bot_id: String,
    pub bot_name: String,
    pub pnl_percent: f64,
}

/// Response of `GET /api/stats`. Every field is optional; a missing field
/// leaves the matching display slot alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    #[serde(default)]
    pub recent_trades_count: Option<u64>,
    #[serde(default)]
    pub active_bots_count: Option<u64>,
    #[serde(default)]
    pub popular_symbols: Option<Vec<PopularSymbol>>,
    #[serde(default)]
    pub biggest_gainer: Option<BotGainer>,
    #[serde(default)]
    pub biggest_loser: Option<BotGainer>,
}
