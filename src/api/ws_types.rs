use serde::{Deserialize, Serialize};

use crate::models::RankingEntry;

/// Push-channel envelope: `{"event": "...", "data": ...}`. `data` stays raw
/// until the tag is known.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

pub const TRADE_EVENT: &str = "trade";
pub const LEADERBOARD_UPDATE_EVENT: &str = "leaderboard_update";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeaderboardUpdate {
    pub rankings: Vec<RankingEntry>,
}
