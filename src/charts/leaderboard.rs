use std::sync::Arc;

use serde::Serialize;

use super::{rgba, ChartBackend, ChartHandle, ChartSpec};
use crate::errors::ClientError;
use crate::models::RankingEntry;
use crate::render::format::{gain_color, money, signed_money, signed_percent};

/// Bars drawn by the leaderboard chart.
pub const MAX_BARS: usize = 10;

const OPACITY_STEP: f64 = 0.07;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub background_color: String,
    pub border_color: String,
    pub tooltip_title: String,
    pub tooltip_lines: Vec<String>,
}

/// Horizontal "Return %" bar chart, one bar per ranked bot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartSpec {
    pub dataset_label: String,
    pub horizontal: bool,
    pub bars: Vec<Bar>,
}

/// Chart configuration for the best-ranked entries (input is already sorted).
/// Bar opacity fades with rank; hue follows the sign of the return.
pub fn bar_chart_spec(rankings: &[RankingEntry]) -> BarChartSpec {
    let bars = rankings
        .iter()
        .take(MAX_BARS)
        .enumerate()
        .map(|(rank, bot)| {
            let positive = bot.is_gaining();
            let opacity = 1.0 - rank as f64 * OPACITY_STEP;
            Bar {
                label: bot.bot_name.clone(),
                value: bot.pnl_percent,
                background_color: rgba(positive, opacity),
                border_color: gain_color(bot.pnl_percent).to_string(),
                tooltip_title: bot.bot_name.clone(),
                tooltip_lines: vec![
                    format!("Return: {}", signed_percent(bot.pnl_percent, 2)),
                    format!("Portfolio: {}", money(bot.total_value)),
                    format!("P&L: {}", signed_money(bot.pnl)),
                    format!("Trades: {}", bot.trade_count),
                ],
            }
        })
        .collect();

    BarChartSpec {
        dataset_label: "Return %".into(),
        horizontal: true,
        bars,
    }
}

/// Mount the leaderboard bar chart on `target`. Empty rankings mount nothing.
pub fn create_leaderboard_bar_chart(
    backend: &Arc<dyn ChartBackend>,
    target: &str,
    rankings: &[RankingEntry],
) -> Result<Option<ChartHandle>, ClientError> {
    if rankings.is_empty() {
        return Ok(None);
    }
    let spec = ChartSpec::Bar(bar_chart_spec(rankings));
    ChartHandle::mount(backend, target, spec).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize, pnl_percent: f64) -> RankingEntry {
        RankingEntry {
            bot_id: format!("b{n}"),
            bot_name: format!("Bot {n}"),
            pnl: pnl_percent * 1000.0,
            pnl_percent,
            total_value: 100_000.0 + pnl_percent * 1000.0,
            trade_count: n as u64,
            rank: None,
            rank_change: None,
            previous_rank: None,
        }
    }

    #[test]
    fn test_at_most_ten_bars_with_fading_opacity() {
        let rankings: Vec<RankingEntry> = (0..14).map(|n| entry(n, 5.0 - n as f64)).collect();
        let spec = bar_chart_spec(&rankings);
        assert_eq!(spec.bars.len(), MAX_BARS);
        assert_eq!(spec.bars[0].background_color, "rgba(16, 185, 129, 1.00)");
        assert_eq!(spec.bars[1].background_color, "rgba(16, 185, 129, 0.93)");
        assert_eq!(spec.bars[9].background_color, "rgba(239, 68, 68, 0.37)");
        assert_eq!(spec.bars[9].border_color, "#ef4444");
    }

    #[test]
    fn test_tooltip_lines() {
        let spec = bar_chart_spec(&[entry(3, -1.5)]);
        assert_eq!(
            spec.bars[0].tooltip_lines,
            vec![
                "Return: -1.50%".to_string(),
                "Portfolio: $98,500.00".to_string(),
                "P&L: $-1,500.00".to_string(),
                "Trades: 3".to_string(),
            ]
        );
    }
}
