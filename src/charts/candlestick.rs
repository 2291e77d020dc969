use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ChartBackend, ChartHandle, ChartSpec};
use crate::errors::ClientError;
use crate::models::Candle;
use crate::render::format::{escape_html, gain_color};

const BAND_PADDING: f64 = 0.2;
const Y_DOMAIN_PAD_LOW: f64 = 0.99;
const Y_DOMAIN_PAD_HIGH: f64 = 1.01;
const MAX_X_TICKS: usize = 10;
const Y_TICKS: usize = 8;
const MIN_BODY_HEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandlestickOptions {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
}

impl Default for CandlestickOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            margin: Margin {
                top: 20.0,
                right: 60.0,
                bottom: 30.0,
                left: 60.0,
            },
        }
    }
}

/// Hover details of one bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleTooltip {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub color: String,
}

impl CandleTooltip {
    pub fn lines(&self) -> Vec<String> {
        let sign = if self.change >= 0.0 { "+" } else { "" };
        let pct_sign = if self.change_percent >= 0.0 { "+" } else { "" };
        vec![
            self.date.clone(),
            format!("Open: ${:.2}", self.open),
            format!("High: ${:.2}", self.high),
            format!("Low: ${:.2}", self.low),
            format!("Close: ${:.2}", self.close),
            format!(
                "Change: {sign}${:.2} ({pct_sign}{:.2}%)",
                self.change, self.change_percent
            ),
        ]
    }
}

/// Geometry of one bar in plot coordinates (origin at the plot's top-left).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandleGlyph {
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub width: f64,
    pub wick_x: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub body_top: f64,
    pub body_height: f64,
    pub color: String,
    pub tooltip: CandleTooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickLayout {
    pub options: CandlestickOptions,
    pub plot_width: f64,
    pub plot_height: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub candles: Vec<CandleGlyph>,
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
}

/// Lay out OHLC bars: band x-scale with 0.2 padding, linear price scale over
/// `[min(low)·0.99, max(high)·1.01]`, and a body of at least one unit so doji
/// bars stay visible. `None` for an empty series.
pub fn layout(candles: &[Candle], options: CandlestickOptions) -> Option<CandlestickLayout> {
    if candles.is_empty() {
        return None;
    }

    let plot_width = options.width - options.margin.left - options.margin.right;
    let plot_height = options.height - options.margin.top - options.margin.bottom;

    let n = candles.len() as f64;
    let step = plot_width / (n - BAND_PADDING + 2.0 * BAND_PADDING);
    let bandwidth = step * (1.0 - BAND_PADDING);
    let offset = step * BAND_PADDING;

    let low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let high = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let price_min = low * Y_DOMAIN_PAD_LOW;
    let price_max = high * Y_DOMAIN_PAD_HIGH;
    let span = if price_max > price_min {
        price_max - price_min
    } else {
        1.0
    };
    let y = |price: f64| plot_height * (1.0 - (price - price_min) / span);

    let glyphs = candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let x = offset + step * i as f64;
            let color = gain_color(c.change()).to_string();
            let body_height = (y(c.open) - y(c.close)).abs().max(MIN_BODY_HEIGHT);
            CandleGlyph {
                timestamp: c.timestamp,
                x,
                width: bandwidth,
                wick_x: x + bandwidth / 2.0,
                wick_top: y(c.high),
                wick_bottom: y(c.low),
                body_top: y(c.open.max(c.close)),
                body_height,
                color: color.clone(),
                tooltip: CandleTooltip {
                    date: c.timestamp.format("%b %d, %Y").to_string(),
                    open: c.open,
                    high: c.high,
                    low: c.low,
                    close: c.close,
                    change: c.change(),
                    change_percent: c.change_percent(),
                    color,
                },
            }
        })
        .collect::<Vec<_>>();

    let tick_every = candles.len().div_ceil(MAX_X_TICKS);
    let x_ticks = glyphs
        .iter()
        .step_by(tick_every)
        .map(|g| AxisTick {
            position: g.wick_x,
            label: g.timestamp.format("%m/%d").to_string(),
        })
        .collect();

    let y_ticks = (0..=Y_TICKS)
        .map(|i| {
            let price = price_min + span * i as f64 / Y_TICKS as f64;
            AxisTick {
                position: y(price),
                label: format!("${price:.2}"),
            }
        })
        .collect();

    Some(CandlestickLayout {
        options,
        plot_width,
        plot_height,
        price_min,
        price_max,
        candles: glyphs,
        x_ticks,
        y_ticks,
    })
}

impl CandlestickLayout {
    /// Standalone SVG rendering; tooltips become `<title>` elements.
    pub fn to_svg(&self) -> String {
        let o = &self.options;
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}"><g transform="translate({},{})">"#,
            o.width, o.height, o.margin.left, o.margin.top
        );

        for tick in &self.y_ticks {
            let _ = write!(
                svg,
                r##"<line class="grid" x1="0" x2="{w:.2}" y1="{y:.2}" y2="{y:.2}" stroke="rgba(255, 255, 255, 0.05)"/><text x="{tx:.2}" y="{y:.2}" fill="#9ca3af">{label}</text>"##,
                w = self.plot_width,
                y = tick.position,
                tx = self.plot_width + 6.0,
                label = escape_html(&tick.label),
            );
        }
        for tick in &self.x_ticks {
            let _ = write!(
                svg,
                r##"<text x="{x:.2}" y="{y:.2}" fill="#9ca3af" text-anchor="middle">{label}</text>"##,
                x = tick.position,
                y = self.plot_height + 18.0,
                label = escape_html(&tick.label),
            );
        }

        for c in &self.candles {
            let _ = write!(
                svg,
                r#"<line class="wick" x1="{x:.2}" x2="{x:.2}" y1="{top:.2}" y2="{bottom:.2}" stroke="{color}" stroke-width="1"/>"#,
                x = c.wick_x,
                top = c.wick_top,
                bottom = c.wick_bottom,
                color = c.color,
            );
            let _ = write!(
                svg,
                r#"<rect class="candle" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}" stroke="{color}" stroke-width="1"><title>{title}</title></rect>"#,
                x = c.x,
                y = c.body_top,
                w = c.width,
                h = c.body_height,
                color = c.color,
                title = escape_html(&c.tooltip.lines().join("\n")),
            );
        }

        svg.push_str("</g></svg>");
        svg
    }
}

/// Mount a candlestick chart on `target`. Empty history mounts nothing.
pub fn create_candlestick_chart(
    backend: &Arc<dyn ChartBackend>,
    target: &str,
    candles: &[Candle],
    options: CandlestickOptions,
) -> Result<Option<ChartHandle>, ClientError> {
    match layout(candles, options) {
        Some(layout) => {
            ChartHandle::mount(backend, target, ChartSpec::Candlestick(layout)).map(Some)
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn candle(day: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap() + Duration::days(day),
            open,
            high,
            low,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn test_colors_and_doji_body() {
        let candles = vec![
            candle(0, 100.0, 110.0, 95.0, 105.0),
            candle(1, 105.0, 106.0, 98.0, 99.0),
            candle(2, 99.0, 101.0, 97.0, 99.0),
        ];
        let layout = layout(&candles, CandlestickOptions::default()).unwrap();

        assert_eq!(layout.candles[0].color, "#10b981");
        assert_eq!(layout.candles[1].color, "#ef4444");
        assert_eq!(layout.candles[2].color, "#10b981");
        assert_eq!(layout.candles[2].body_height, 1.0);
        for g in &layout.candles {
            assert!(g.wick_top <= g.body_top);
            assert!(g.body_top + g.body_height <= g.wick_bottom + MIN_BODY_HEIGHT);
        }
    }

    #[test]
    fn test_band_scale_geometry() {
        let candles: Vec<Candle> = (0..4).map(|d| candle(d, 10.0, 12.0, 9.0, 11.0)).collect();
        let layout = layout(&candles, CandlestickOptions::default()).unwrap();

        // 680px plot, 4 bands: step = 680 / 4.2
        let step = 680.0 / 4.2;
        assert!((layout.candles[0].x - step * 0.2).abs() < 1e-9);
        assert!((layout.candles[3].x - step * 3.2).abs() < 1e-9);
        assert!((layout.candles[0].width - step * 0.8).abs() < 1e-9);
        let right_edge = layout.candles[3].x + layout.candles[3].width;
        assert!((layout.plot_width - right_edge - step * 0.2).abs() < 1e-9);
        assert!((layout.price_min - 9.0 * 0.99).abs() < 1e-9);
        assert!((layout.price_max - 12.0 * 1.01).abs() < 1e-9);
    }

    #[test]
    fn test_tooltip_lines() {
        let layout = layout(
            &[candle(0, 200.0, 210.0, 190.0, 190.0)],
            CandlestickOptions::default(),
        )
        .unwrap();
        let lines = layout.candles[0].tooltip.lines();
        assert_eq!(lines[0], "Mar 02, 2026");
        assert_eq!(lines[4], "Close: $190.00");
        assert_eq!(lines[5], "Change: $-10.00 (-5.00%)");
    }

    #[test]
    fn test_x_ticks_are_thinned() {
        let candles: Vec<Candle> = (0..25).map(|d| candle(d, 10.0, 12.0, 9.0, 11.0)).collect();
        let layout = layout(&candles, CandlestickOptions::default()).unwrap();
        assert_eq!(layout.x_ticks.len(), 9);
        assert_eq!(layout.x_ticks[0].label, "03/02");
        assert_eq!(layout.y_ticks.len(), Y_TICKS + 1);
    }

    #[test]
    fn test_svg_has_one_body_per_candle() {
        let candles: Vec<Candle> = (0..5).map(|d| candle(d, 10.0, 12.0, 9.0, 11.0)).collect();
        let svg = layout(&candles, CandlestickOptions::default()).unwrap().to_svg();
        assert_eq!(svg.matches(r#"class="candle""#).count(), 5);
        assert_eq!(svg.matches(r#"class="wick""#).count(), 5);
        assert!(svg.ends_with("</g></svg>"));
    }

    #[test]
    fn test_empty_series() {
        assert!(layout(&[], CandlestickOptions::default()).is_none());
    }
}
