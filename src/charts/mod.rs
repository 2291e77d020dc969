//! Chart adapters: translate domain records into chart configuration and
//! mount it through a [`ChartBackend`].
//!
//! Adapters never clean up an earlier instance on the same mount point; the
//! caller destroys it first (see [`ChartSlot`]).

pub mod candlestick;
pub mod leaderboard;
pub mod portfolio;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::errors::ClientError;

pub use candlestick::{create_candlestick_chart, CandlestickLayout, CandlestickOptions};
pub use leaderboard::{create_leaderboard_bar_chart, BarChartSpec};
pub use portfolio::{create_portfolio_mini_chart, LineChartSpec, PortfolioSeries};

pub type ChartId = u64;

pub const POSITIVE_RGB: (u8, u8, u8) = (16, 185, 129);
pub const NEGATIVE_RGB: (u8, u8, u8) = (239, 68, 68);

/// CSS `rgba()` of the gain/loss palette.
pub fn rgba(positive: bool, alpha: f64) -> String {
    let (r, g, b) = if positive { POSITIVE_RGB } else { NEGATIVE_RGB };
    format!("rgba({r}, {g}, {b}, {alpha:.2})")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar(BarChartSpec),
    Line(LineChartSpec),
    Candlestick(CandlestickLayout),
}

/// Rendering library seam. Implementations own the live chart instances.
pub trait ChartBackend: Send + Sync {
    fn mount(&self, target: &str, spec: ChartSpec) -> Result<ChartId, ClientError>;

    fn unmount(&self, id: ChartId);
}

// ---------------------------------------------------------------------------
// ChartHandle
// ---------------------------------------------------------------------------

/// Disposable handle to a mounted chart. The instance is released exactly
/// once, by [`ChartHandle::destroy`] or on drop.
pub struct ChartHandle {
    id: ChartId,
    target: String,
    backend: Arc<dyn ChartBackend>,
    live: bool,
}

impl ChartHandle {
    pub fn mount(
        backend: &Arc<dyn ChartBackend>,
        target: &str,
        spec: ChartSpec,
    ) -> Result<Self, ClientError> {
        let id = backend.mount(target, spec)?;
        Ok(Self {
            id,
            target: target.to_string(),
            backend: Arc::clone(backend),
            live: true,
        })
    }

    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.live {
            self.live = false;
            self.backend.unmount(self.id);
        }
    }
}

impl Drop for ChartHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ChartHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartHandle")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("live", &self.live)
            .finish()
    }
}

/// Caller-side holder enforcing at most one instance per mount point.
#[derive(Debug, Default)]
pub struct ChartSlot {
    handle: Option<ChartHandle>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy the current instance, if any.
    pub fn clear(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.destroy();
        }
    }

    /// Store a freshly created instance, destroying any previous one.
    pub fn set(&mut self, handle: Option<ChartHandle>) {
        self.clear();
        self.handle = handle;
    }

    pub fn get(&self) -> Option<&ChartHandle> {
        self.handle.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }
}

// ---------------------------------------------------------------------------
// InMemoryCharts
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct ChartRegistry {
    next_id: ChartId,
    active: BTreeMap<ChartId, (String, ChartSpec)>,
    created: u64,
    destroyed: u64,
}

/// Backend that keeps mounted chart configurations in memory. Used headless
/// and in tests; `snapshot_json` exports what a renderer would draw.
#[derive(Debug, Default)]
pub struct InMemoryCharts {
    registry: Mutex<ChartRegistry>,
}

impl InMemoryCharts {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, ChartRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn active_count(&self) -> usize {
        self.registry().active.len()
    }

    /// Configurations currently mounted on `target`, oldest first.
    pub fn active_on(&self, target: &str) -> Vec<ChartSpec> {
        self.registry()
            .active
            .values()
            .filter(|(t, _)| t == target)
            .map(|(_, spec)| spec.clone())
            .collect()
    }

    pub fn created(&self) -> u64 {
        self.registry().created
    }

    pub fn destroyed(&self) -> u64 {
        self.registry().destroyed
    }

    pub fn snapshot_json(&self) -> Result<String, ClientError> {
        let registry = self.registry();
        let charts: BTreeMap<String, &ChartSpec> = registry
            .active
            .iter()
            .map(|(id, (target, spec))| (format!("{target}#{id}"), spec))
            .collect();
        Ok(serde_json::to_string_pretty(&charts)?)
    }
}

impl ChartBackend for InMemoryCharts {
    fn mount(&self, target: &str, spec: ChartSpec) -> Result<ChartId, ClientError> {
        let mut registry = self.registry();
        registry.next_id += 1;
        registry.created += 1;
        let id = registry.next_id;
        registry.active.insert(id, (target.to_string(), spec));
        tracing::debug!(chart_id = id, target, "Chart mounted");
        Ok(id)
    }

    fn unmount(&self, id: ChartId) {
        let mut registry = self.registry();
        if registry.active.remove(&id).is_some() {
            registry.destroyed += 1;
            tracing::debug!(chart_id = id, "Chart destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RankingEntry;

    fn spec() -> ChartSpec {
        let entry = RankingEntry {
            bot_id: "b".into(),
            bot_name: "B".into(),
            pnl: 1.0,
            pnl_percent: 1.0,
            total_value: 1.0,
            trade_count: 1,
            rank: None,
            rank_change: None,
            previous_rank: None,
        };
        ChartSpec::Bar(leaderboard::bar_chart_spec(&[entry]))
    }

    #[test]
    fn test_handle_releases_once() {
        let charts = Arc::new(InMemoryCharts::new());
        let backend: Arc<dyn ChartBackend> = charts.clone();
        let handle = ChartHandle::mount(&backend, "canvas", spec()).unwrap();
        assert_eq!(charts.active_count(), 1);
        handle.destroy();
        assert_eq!(charts.active_count(), 0);
        assert_eq!(charts.destroyed(), 1);

        {
            let _dropped = ChartHandle::mount(&backend, "canvas", spec()).unwrap();
        }
        assert_eq!(charts.active_count(), 0);
        assert_eq!(charts.destroyed(), 2);
    }

    #[test]
    fn test_slot_keeps_one_instance() {
        let charts = Arc::new(InMemoryCharts::new());
        let backend: Arc<dyn ChartBackend> = charts.clone();
        let mut slot = ChartSlot::new();
        for _ in 0..3 {
            slot.clear();
            slot.set(Some(ChartHandle::mount(&backend, "canvas", spec()).unwrap()));
        }
        assert_eq!(charts.active_on("canvas").len(), 1);
        assert_eq!(charts.created(), 3);
        slot.clear();
        assert!(slot.is_empty());
        assert_eq!(charts.active_count(), 0);
    }
}
