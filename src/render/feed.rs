use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::format::{bot_link, escape_html, symbol_link};
use super::{mounts, Surface};
use crate::models::{Side, TradeEvent};
use crate::narrative;

/// Maximum number of trades kept in the live feed.
pub const FEED_CAPACITY: usize = 100;

const EMPTY_FEED_HTML: &str = r#"<div class="empty-state">Waiting for trades...</div>"#;

/// Live trade feed: newest first, bounded to [`FEED_CAPACITY`] items.
///
/// Order is arrival order, not `executed_at`.
pub struct FeedRenderer {
    items: VecDeque<String>,
    capacity: usize,
    rng: StdRng,
}

impl FeedRenderer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Feed whose narratives are drawn from `rng`; seed it for reproducible
    /// output.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            items: VecDeque::with_capacity(FEED_CAPACITY),
            capacity: FEED_CAPACITY,
            rng,
        }
    }

    /// Write the empty placeholder. Only meaningful before the first trade.
    pub fn render_empty<S: Surface + ?Sized>(&self, surface: &mut S) {
        if self.items.is_empty() {
            surface.set_html(mounts::TRADE_FEED, EMPTY_FEED_HTML.to_string());
        }
    }

    pub fn push_trade<S: Surface + ?Sized>(&mut self, trade: &TradeEvent, surface: &mut S) {
        let narrative = narrative::narrate(trade, &mut self.rng);
        self.items.push_front(render_item(trade, &narrative));
        while self.items.len() > self.capacity {
            self.items.pop_back();
        }
        metrics::counter!("feed_trades_total").increment(1);

        let html: String = self.items.iter().map(String::as_str).collect();
        surface.set_html(mounts::TRADE_FEED, html);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Rendered items, newest first.
    pub fn items(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

impl std::fmt::Debug for FeedRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRenderer")
            .field("items", &self.items.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for FeedRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_item(trade: &TradeEvent, narrative: &str) -> String {
    let side_label = escape_html(&trade.side.to_lowercase());
    let side_class = match trade.parsed_side() {
        Some(Side::Buy) => "buy",
        _ => "sell",
    };

    format!(
        concat!(
            r#"<div class="trade-item">"#,
            r#"<span class="bot-name"><a href="{bot_href}">{bot_name}</a></span>"#,
            r#"<span class="action {side_class}">{side_label}</span>"#,
            r#"<span class="details">{quantity} <a href="{symbol_href}">{symbol}</a> @ ${price:.2}</span>"#,
            r#"<span class="reasoning">{narrative}</span>"#,
            "</div>",
        ),
        bot_href = bot_link(&trade.bot_id),
        bot_name = escape_html(&trade.bot_name),
        side_class = side_class,
        side_label = side_label,
        quantity = trade.quantity,
        symbol_href = symbol_link(&trade.symbol),
        symbol = escape_html(&trade.symbol),
        price = trade.price,
        narrative = escape_html(narrative),
    )
}
