use super::format::{bot_link, escape_html, gain_class, group_thousands, money, symbol_link};
use super::mounts;
use crate::models::{BotDetail, RankingEntry};

/// Holdings listed on each dashboard card.
pub const TOP_HOLDINGS: usize = 3;

pub const NO_BOT_DATA_HTML: &str =
    r#"<p class="text-muted text-center p-24">No bot data to display.</p>"#;
pub const BOT_DATA_FAILED_HTML: &str =
    r#"<p class="text-muted text-center p-24">Failed to load bot data.</p>"#;
pub const BOT_DATA_LOADING_HTML: &str =
    r#"<div class="chart-loading text-center p-24">Loading bot charts...</div>"#;

/// Markup of one dashboard card: name, latest value, P&L %, chart canvas and
/// top holdings. `index` selects the canvas mount id.
pub fn render_card(index: usize, entry: &RankingEntry, detail: &BotDetail) -> String {
    let portfolio = &detail.portfolio;
    let total_value = portfolio.total_value;
    let pnl_percent = portfolio.total_pnl_percent;
    let sign = if pnl_percent >= 0.0 { "+" } else { "" };
    let name = if detail.name.is_empty() {
        &entry.bot_name
    } else {
        &detail.name
    };

    let mut html = String::new();
    html.push_str(r#"<div class="dashboard-bot-card card card-chart">"#);
    html.push_str(&format!(
        r#"<h3 class="dashboard-bot-card-title"><a href="{}">{}</a></h3>"#,
        bot_link(&entry.bot_id),
        escape_html(name),
    ));
    html.push_str(&format!(
        r#"<p class="dashboard-bot-card-stat {}">{} <span class="text-muted">({sign}{:.2}%)</span></p>"#,
        gain_class(pnl_percent),
        money(total_value),
        pnl_percent,
    ));
    html.push_str(&format!(
        r#"<div class="dashboard-bot-chart-wrapper chart-wrapper"><canvas id="{}"></canvas></div>"#,
        mounts::bot_card_chart(index),
    ));

    let holdings = portfolio.top_holdings(TOP_HOLDINGS);
    if !holdings.is_empty() {
        html.push_str(r#"<div class="top-holdings"><div class="top-holdings-title">TOP HOLDINGS</div>"#);
        for pos in holdings {
            let share = if total_value > 0.0 {
                pos.market_value / total_value * 100.0
            } else {
                0.0
            };
            let pnl = pos.unrealized_pnl;
            let pnl_sign = if pnl >= 0.0 { "+" } else { "-" };
            html.push_str(&format!(
                concat!(
                    r#"<div class="holding">"#,
                    r#"<a href="{href}">{symbol}</a><span class="text-muted">{share:.1}%</span>"#,
                    r#"<span class="{class}">{pnl_sign}${pnl}</span>"#,
                    "</div>",
                ),
                href = symbol_link(&pos.symbol),
                symbol = escape_html(&pos.symbol),
                share = share,
                class = gain_class(pnl),
                pnl_sign = pnl_sign,
                pnl = group_thousands(pnl.abs(), 0),
            ));
        }
        html.push_str("</div>");
    }

    html.push_str("</div>");
    html
}
