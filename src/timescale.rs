use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Candle, PortfolioSnapshot, TradeEvent};

/// Anchor used by "no data yet" chart fallbacks when the scale has no window.
const FALLBACK_RANGE_MINUTES: i64 = 60;

// ---------------------------------------------------------------------------
// TimeScale
// ---------------------------------------------------------------------------

/// Symbolic chart range selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeScale {
    #[serde(rename = "1D")]
    Day,
    #[serde(rename = "1W")]
    Week,
    #[serde(rename = "1M")]
    Month,
    #[serde(rename = "1Y")]
    #[default]
    Year,
    #[serde(rename = "ALL")]
    All,
}

impl TimeScale {
    pub const ALL_SCALES: [TimeScale; 5] = [
        TimeScale::Day,
        TimeScale::Week,
        TimeScale::Month,
        TimeScale::Year,
        TimeScale::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeScale::Day => "1D",
            TimeScale::Week => "1W",
            TimeScale::Month => "1M",
            TimeScale::Year => "1Y",
            TimeScale::All => "ALL",
        }
    }

    /// Lenient parse used for filtering: unknown tokens mean "no filter".
    pub fn parse_or_all(s: &str) -> Self {
        s.parse().unwrap_or(TimeScale::All)
    }

    /// Trailing window covered by this scale; `None` for [`TimeScale::All`].
    pub fn window(&self) -> Option<Duration> {
        match self {
            TimeScale::Day => Some(Duration::hours(24)),
            TimeScale::Week => Some(Duration::days(7)),
            TimeScale::Month => Some(Duration::days(30)),
            TimeScale::Year => Some(Duration::days(365)),
            TimeScale::All => None,
        }
    }

    /// Oldest instant kept by [`filter_by_window`] at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.window().map(|w| now - w)
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            TimeScale::Day => Granularity::Minute,
            TimeScale::Week => Granularity::Hour,
            TimeScale::Month | TimeScale::Year | TimeScale::All => Granularity::Day,
        }
    }

    /// Left edge of a chart that has no data to span. `ALL` has no window of
    /// its own and falls back to the last hour.
    pub fn range_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window().unwrap_or(Duration::minutes(FALLBACK_RANGE_MINUTES))
    }
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time scale: {0}")]
pub struct UnknownTimeScale(pub String);

impl FromStr for TimeScale {
    type Err = UnknownTimeScale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "1D" => Ok(TimeScale::Day),
            "1W" => Ok(TimeScale::Week),
            "1M" => Ok(TimeScale::Month),
            "1Y" => Ok(TimeScale::Year),
            "ALL" => Ok(TimeScale::All),
            _ => Err(UnknownTimeScale(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

/// Time-axis unit for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    Hour,
    Day,
}

impl Granularity {
    /// Axis label format (chrono strftime).
    pub fn display_format(&self) -> &'static str {
        match self {
            Granularity::Minute => "%H:%M",
            Granularity::Hour => "%b %-d, %H:%M",
            Granularity::Day => "%b %-d",
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Records carrying the instant used for time-window filtering.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for TradeEvent {
    fn timestamp(&self) -> DateTime<Utc> {
        self.executed_at
    }
}

impl Timestamped for PortfolioSnapshot {
    fn timestamp(&self) -> DateTime<Utc> {
        self.snapshot_at
    }
}

impl Timestamped for Candle {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Keep the records whose timestamp falls inside `scale`'s trailing window at
/// `now`, in their original order. `ALL` returns every record.
pub fn filter_by_window<T>(records: &[T], scale: TimeScale, now: DateTime<Utc>) -> Vec<T>
where
    T: Timestamped + Clone,
{
    match scale.cutoff(now) {
        None => records.to_vec(),
        Some(cutoff) => records
            .iter()
            .filter(|r| r.timestamp() >= cutoff)
            .cloned()
            .collect(),
    }
}
