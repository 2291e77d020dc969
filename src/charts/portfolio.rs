use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::{rgba, ChartBackend, ChartHandle, ChartSpec};
use crate::errors::ClientError;
use crate::models::{PortfolioSnapshot, Side, TradeEvent};
use crate::render::format::{money, NEGATIVE_COLOR, POSITIVE_COLOR};
use crate::timescale::{filter_by_window, Granularity, TimeScale};

/// Cash every bot starts with; the profit/loss color threshold.
pub const STARTING_BALANCE: f64 = 100_000.0;

/// A snapshot series older than this gets a "now" point appended.
const STALE_SNAPSHOT_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuePoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl ValuePoint {
    pub fn new(time: DateTime<Utc>, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    Snapshots,
    TradeReplay,
    Flat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSeries {
    pub source: SeriesSource,
    pub points: Vec<ValuePoint>,
}

// ---------------------------------------------------------------------------
// Series construction
// ---------------------------------------------------------------------------

/// Windowed snapshot values, plus a trailing `(now, current_value)` point
/// when the newest snapshot is more than an hour old. `None` when the window
/// holds no snapshot.
pub fn points_from_snapshots(
    snapshots: &[PortfolioSnapshot],
    current_value: f64,
    scale: TimeScale,
    now: DateTime<Utc>,
) -> Option<Vec<ValuePoint>> {
    let filtered = filter_by_window(snapshots, scale, now);
    let last = filtered.last()?.snapshot_at;

    let mut points: Vec<ValuePoint> = filtered
        .iter()
        .map(|s| ValuePoint::new(s.snapshot_at, s.total_value))
        .collect();
    if last < now - Duration::minutes(STALE_SNAPSHOT_MINUTES) {
        points.push(ValuePoint::new(now, current_value));
    }
    Some(points)
}

/// Approximate value history replayed from a newest-first trade list.
///
/// Starts at [`STARTING_BALANCE`] anchored on the oldest trade, emits one
/// point per trade, and ends at `(now, current_value)`, or at the newest
/// trade's time if that lies after `now`. Open holdings are
/// marked at the most recent traded price of their symbol, so a step's value
/// is `cash + Σ quantity × last_price`. `None` when the window holds no trade.
pub fn reconstruct_from_trades(
    trades: &[TradeEvent],
    current_value: f64,
    scale: TimeScale,
    now: DateTime<Utc>,
) -> Option<Vec<ValuePoint>> {
    let filtered = filter_by_window(trades, scale, now);
    let oldest = filtered.last()?;

    let mut points = Vec::with_capacity(filtered.len() + 2);
    points.push(ValuePoint::new(oldest.executed_at, STARTING_BALANCE));

    let mut cash = STARTING_BALANCE;
    let mut holdings: HashMap<&str, f64> = HashMap::new();
    let mut last_price: HashMap<&str, f64> = HashMap::new();

    for trade in filtered.iter().rev() {
        let symbol = trade.symbol.as_str();
        last_price.insert(symbol, trade.price);

        match trade.parsed_side() {
            Some(Side::Buy) => {
                cash -= trade.notional();
                *holdings.entry(symbol).or_insert(0.0) += trade.quantity;
            }
            Some(Side::Sell) => {
                cash += trade.notional();
                let held = holdings.entry(symbol).or_insert(0.0);
                *held -= trade.quantity;
                if *held <= 0.0 {
                    holdings.remove(symbol);
                }
            }
            None => {
                tracing::debug!(side = %trade.side, symbol, "Unknown side in replay");
            }
        }

        let marked: f64 = holdings
            .iter()
            .map(|(sym, qty)| qty * last_price.get(sym).copied().unwrap_or(0.0))
            .sum();
        points.push(ValuePoint::new(trade.executed_at, cash + marked));
    }

    let newest = points.last().map_or(now, |p| p.time);
    points.push(ValuePoint::new(newest.max(now), current_value));
    Some(points)
}

/// Snapshots first, then trade replay, then a flat line from
/// `(range_start, STARTING_BALANCE)` to `(now, current_value)`.
pub fn portfolio_series(
    snapshots: &[PortfolioSnapshot],
    trades: &[TradeEvent],
    current_value: f64,
    scale: TimeScale,
    now: DateTime<Utc>,
) -> PortfolioSeries {
    if let Some(points) = points_from_snapshots(snapshots, current_value, scale, now) {
        return PortfolioSeries {
            source: SeriesSource::Snapshots,
            points,
        };
    }
    if let Some(points) = reconstruct_from_trades(trades, current_value, scale, now) {
        return PortfolioSeries {
            source: SeriesSource::TradeReplay,
            points,
        };
    }
    PortfolioSeries {
        source: SeriesSource::Flat,
        points: vec![
            ValuePoint::new(scale.range_start(now), STARTING_BALANCE),
            ValuePoint::new(now, current_value),
        ],
    }
}

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChartSpec {
    pub dataset_label: String,
    pub source: SeriesSource,
    pub points: Vec<ValuePoint>,
    /// Current value at or above [`STARTING_BALANCE`]; picks the palette.
    pub profit: bool,
    pub border_color: String,
    /// Vertical fill gradient, top to bottom.
    pub fill_gradient: Vec<GradientStop>,
    pub tension: f64,
    pub time_unit: Granularity,
    pub time_format: String,
    pub tooltip_labels: Vec<String>,
}

pub fn mini_chart_spec(
    series: PortfolioSeries,
    current_value: f64,
    scale: TimeScale,
) -> LineChartSpec {
    let profit = current_value >= STARTING_BALANCE;
    let granularity = scale.granularity();
    let fill_gradient = [(0.0, 0.4), (0.5, 0.15), (1.0, 0.01)]
        .into_iter()
        .map(|(offset, alpha)| GradientStop {
            offset,
            color: rgba(profit, alpha),
        })
        .collect();
    let tooltip_labels = series.points.iter().map(|p| money(p.value)).collect();

    LineChartSpec {
        dataset_label: "Portfolio Value".into(),
        source: series.source,
        points: series.points,
        profit,
        border_color: if profit { POSITIVE_COLOR } else { NEGATIVE_COLOR }.to_string(),
        fill_gradient,
        tension: 0.4,
        time_unit: granularity,
        time_format: granularity.display_format().to_string(),
        tooltip_labels,
    }
}

/// Mount a bot's mini "portfolio value over time" chart on `target`.
pub fn create_portfolio_mini_chart(
    backend: &Arc<dyn ChartBackend>,
    target: &str,
    snapshots: &[PortfolioSnapshot],
    trades: &[TradeEvent],
    current_value: f64,
    scale: TimeScale,
    now: DateTime<Utc>,
) -> Result<ChartHandle, ClientError> {
    let series = portfolio_series(snapshots, trades, current_value, scale, now);
    let spec = mini_chart_spec(series, current_value, scale);
    ChartHandle::mount(backend, target, ChartSpec::Line(spec))
}
