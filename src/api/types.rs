use serde::{Deserialize, Serialize};

use crate::models::{Candle, RankingEntry};

// ---------------------------------------------------------------------------
// REST responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeaderboardResponse {
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub rankings: Vec<RankingEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandleHistory {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub candles: Vec<Candle>,
}
