use std::sync::Arc;

use crate::api::DashboardApi;
use crate::charts::{create_candlestick_chart, CandlestickOptions, ChartBackend, ChartSlot};
use crate::render::format::escape_html;
use crate::render::{mounts, Surface};

pub const DEFAULT_TIMEFRAME: &str = "1Day";
pub const DEFAULT_DAYS: u32 = 30;
/// History endpoint serves at most a year.
pub const MAX_DAYS: u32 = 365;

const NO_PRICE_DATA_HTML: &str = r#"<p class="text-muted text-center p-24">No price data</p>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolChartLoad {
    Rendered { candles: usize },
    Empty,
    Failed,
}

/// Per-symbol price page: OHLC history rendered as a candlestick chart.
pub struct SymbolChart<S> {
    api: DashboardApi,
    charts: Option<Arc<dyn ChartBackend>>,
    surface: S,
    options: CandlestickOptions,
    chart: ChartSlot,
}

impl<S: Surface> SymbolChart<S> {
    pub fn new(api: DashboardApi, charts: Option<Arc<dyn ChartBackend>>, surface: S) -> Self {
        Self {
            api,
            charts,
            surface,
            options: CandlestickOptions::default(),
            chart: ChartSlot::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Fetch `days` of `timeframe` candles and replace whatever chart is on
    /// the mount. `days` is clamped to `1..=365`.
    pub async fn load(&mut self, symbol: &str, timeframe: &str, days: u32) -> SymbolChartLoad {
        let days = days.clamp(1, MAX_DAYS);
        tracing::info!(symbol, timeframe, days, "Loading price history");

        let candles = match self.api.candles(symbol, timeframe, days).await {
            Ok(candles) => candles,
            Err(e) => {
                tracing::error!(symbol, error = %e, "Price history load failed");
                self.chart.clear();
                self.surface.set_html(
                    mounts::CANDLESTICK_CHART,
                    format!(
                        r#"<p class="text-muted text-center p-24">Failed to load price data for {}.</p>"#,
                        escape_html(symbol)
                    ),
                );
                return SymbolChartLoad::Failed;
            }
        };

        self.chart.clear();
        if candles.is_empty() {
            self.surface
                .set_html(mounts::CANDLESTICK_CHART, NO_PRICE_DATA_HTML.to_string());
            return SymbolChartLoad::Empty;
        }

        let Some(backend) = &self.charts else {
            return SymbolChartLoad::Rendered {
                candles: candles.len(),
            };
        };
        match create_candlestick_chart(backend, mounts::CANDLESTICK_CHART, &candles, self.options) {
            Ok(handle) => self.chart.set(handle),
            Err(e) => tracing::warn!(symbol, error = %e, "Candlestick chart not rendered"),
        }
        SymbolChartLoad::Rendered {
            candles: candles.len(),
        }
    }

    pub fn teardown(&mut self) {
        self.chart.clear();
    }

    pub fn is_mounted(&self) -> bool {
        !self.chart.is_empty()
    }
}
