use super::format::{bot_link, escape_html, gain_color, signed_percent, symbol_link};
use super::{mounts, Surface};
use crate::models::StatsSummary;

const NO_TRADES_TODAY: &str = "No trades today";
const NO_GAINER: &str = "-";

/// The four summary fields of the stats bar. Every field is written
/// independently of the others.
#[derive(Debug, Default)]
pub struct StatsRenderer;

impl StatsRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn update<S: Surface + ?Sized>(&mut self, stats: &StatsSummary, surface: &mut S) {
        if let Some(count) = stats.recent_trades_count {
            surface.set_text(mounts::STAT_RECENT_TRADES, recent_trades_text(count));
        }

        if let Some(count) = stats.active_bots_count {
            surface.set_text(mounts::STAT_ACTIVE_BOTS, active_bots_text(count));
        }

        match stats.popular_symbols.as_deref().and_then(<[_]>::first) {
            Some(top) => surface.set_html(
                mounts::STAT_POPULAR_SYMBOL,
                format!(
                    r#"<a href="{href}">{symbol}</a> <span class="text-muted">({count} bots)</span>"#,
                    href = symbol_link(&top.symbol),
                    symbol = escape_html(&top.symbol),
                    count = top.bot_count,
                ),
            ),
            None => surface.set_text(mounts::STAT_POPULAR_SYMBOL, NO_TRADES_TODAY.into()),
        }

        match &stats.biggest_gainer {
            Some(gainer) => {
                let color = gain_color(gainer.pnl_percent);
                surface.set_html(
                    mounts::STAT_BIGGEST_GAINER,
                    format!(
                        r#"<a href="{href}" style="color: {color};">{name}</a> <span style="color: {color};">{pct}</span>"#,
                        href = bot_link(&gainer.bot_id),
                        name = escape_html(&gainer.bot_name),
                        pct = signed_percent(gainer.pnl_percent, 1),
                    ),
                );
            }
            None => surface.set_text(mounts::STAT_BIGGEST_GAINER, NO_GAINER.into()),
        }
    }
}

fn recent_trades_text(count: u64) -> String {
    if count == 1 {
        "1 trade in last hour".into()
    } else {
        format!("{count} trades in last hour")
    }
}

fn active_bots_text(count: u64) -> String {
    if count == 1 {
        "1 bot".into()
    } else {
        format!("{count} bots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BotGainer, PopularSymbol};
    use crate::render::MemorySurface;

    #[test]
    fn test_full_summary() {
        let stats = StatsSummary {
            recent_trades_count: Some(1),
            active_bots_count: Some(12),
            popular_symbols: Some(vec![PopularSymbol {
                symbol: "NVDA".into(),
                trade_count: 40,
                bot_count: 7,
            }]),
            biggest_gainer: Some(BotGainer {
                bot_id: "b9".into(),
                bot_name: "Momentum <9>".into(),
                pnl_percent: 12.345,
            }),
            biggest_loser: None,
        };
        let mut surface = MemorySurface::new();
        StatsRenderer::new().update(&stats, &mut surface);

        assert_eq!(surface.text(mounts::STAT_RECENT_TRADES), Some("1 trade in last hour"));
        assert_eq!(surface.text(mounts::STAT_ACTIVE_BOTS), Some("12 bots"));
        let popular = surface.html(mounts::STAT_POPULAR_SYMBOL).unwrap();
        assert!(popular.contains("/chart.html?symbol=NVDA"));
        assert!(popular.contains("(7 bots)"));
        let gainer = surface.html(mounts::STAT_BIGGEST_GAINER).unwrap();
        assert!(gainer.contains("Momentum &lt;9&gt;"));
        assert!(gainer.contains("+12.3%"));
        assert!(gainer.contains("#10b981"));
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let mut surface = MemorySurface::new();
        surface.set_text(mounts::STAT_ACTIVE_BOTS, "3 bots".into());
        StatsRenderer::new().update(&StatsSummary::default(), &mut surface);

        assert_eq!(surface.content(mounts::STAT_RECENT_TRADES), None);
        assert_eq!(surface.text(mounts::STAT_ACTIVE_BOTS), Some("3 bots"));
        assert_eq!(surface.text(mounts::STAT_POPULAR_SYMBOL), Some("No trades today"));
        assert_eq!(surface.text(mounts::STAT_BIGGEST_GAINER), Some("-"));
    }

    #[test]
    fn test_plurals() {
        assert_eq!(recent_trades_text(0), "0 trades in last hour");
        assert_eq!(active_bots_text(1), "1 bot");
    }
}
