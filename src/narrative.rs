use rand::Rng;

use crate::models::{Side, TradeEvent};

const BIG_POSITION_QTY: f64 = 100.0;
const SOLID_POSITION_QTY: f64 = 50.0;

const PHRASES_PER_SIDE: usize = 5;

fn phrase(side: Side, symbol: &str, index: usize) -> String {
    match (side, index % PHRASES_PER_SIDE) {
        (Side::Buy, 0) => format!("📈 Going long on {symbol}"),
        (Side::Buy, 1) => format!("🎯 Taking a position in {symbol}"),
        (Side::Buy, 2) => format!("💰 Loading up on {symbol}"),
        (Side::Buy, 3) => format!("🚀 Betting on {symbol}"),
        (Side::Buy, _) => format!("⚡ Jumping into {symbol}"),
        (Side::Sell, 0) => format!("📉 Closing {symbol} position"),
        (Side::Sell, 1) => format!("💸 Taking profits on {symbol}"),
        (Side::Sell, 2) => format!("🎯 Exiting {symbol}"),
        (Side::Sell, 3) => format!("📊 Cashing out {symbol}"),
        (Side::Sell, _) => format!("✅ Locking in {symbol} gains"),
    }
}

/// Flavor text for a feed entry, with the phrasing picked by `rng`.
///
/// Identical trades may produce different text on every call.
pub fn narrate<R: Rng + ?Sized>(trade: &TradeEvent, rng: &mut R) -> String {
    compose(trade, rng.gen_range(0..PHRASES_PER_SIDE))
}

/// Deterministic core of [`narrate`]: phrasing `index` (mod 5) for the trade's
/// side, decorated by position size. Unknown sides use the buy phrasings.
pub fn compose(trade: &TradeEvent, index: usize) -> String {
    let side = trade.parsed_side().unwrap_or(Side::Buy);
    let base = phrase(side, &trade.symbol, index);

    if trade.quantity >= BIG_POSITION_QTY {
        format!("🔥 {base} - BIG position!")
    } else if trade.quantity >= SOLID_POSITION_QTY {
        format!("💪 {base}")
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn trade(side: &str, quantity: f64) -> TradeEvent {
        TradeEvent {
            bot_id: "b1".into(),
            bot_name: "Alpha".into(),
            symbol: "AAPL".into(),
            side: side.into(),
            quantity,
            price: 10.0,
            executed_at: Utc::now(),
            reasoning: None,
            total: None,
        }
    }

    #[test]
    fn test_size_modifiers() {
        assert_eq!(
            compose(&trade("buy", 150.0), 0),
            "🔥 📈 Going long on AAPL - BIG position!"
        );
        assert_eq!(compose(&trade("sell", 50.0), 1), "💪 💸 Taking profits on AAPL");
        assert_eq!(compose(&trade("sell", 49.0), 4), "✅ Locking in AAPL gains");
    }

    #[test]
    fn test_unknown_side_uses_buy_phrases() {
        assert_eq!(compose(&trade("short", 1.0), 3), "🚀 Betting on AAPL");
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let t = trade("buy", 10.0);
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let text = narrate(&t, &mut a);
            assert_eq!(text, narrate(&t, &mut b));
            assert!((0..PHRASES_PER_SIDE).any(|i| compose(&t, i) == text));
        }
    }
}
