use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Side;

/// A single executed bot trade, as pushed over the live channel or listed in
/// a bot's recent trade history.
///
/// The push server names the execution time `timestamp` while the bot detail
/// endpoint uses `executed_at`; both are accepted. When neither is present the
/// arrival time stands in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    #[serde(default)]
    pub bot_id: String,
    #[serde(default)]
    pub bot_name: String,
    pub symbol: String,
    pub side: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(alias = "timestamp", default = "Utc::now")]
    pub executed_at: DateTime<Utc>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(alias = "total_value", default)]
    pub total: Option<f64>,
}

impl TradeEvent {
    /// Interpreted side; `None` for anything other than buy/sell.
    pub fn parsed_side(&self) -> Option<Side> {
        Side::from_api_str(&self.side)
    }

    /// Trade notional: the server-reported total when present, else
    /// `quantity × price`.
    pub fn notional(&self) -> f64 {
        self.total.unwrap_or(self.quantity * self.price)
    }
}
