use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLC bar from `GET /api/market/history/{symbol}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: u64,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }

    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// Percentage change from open to close; zero when the open is zero.
    pub fn change_percent(&self) -> f64 {
        if self.open == 0.0 {
            return 0.0;
        }
        self.change() / self.open * 100.0
    }
}
