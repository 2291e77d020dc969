pub mod controller;
pub mod symbol_chart;

pub use controller::{DashboardController, DashboardLoad};
pub use symbol_chart::{SymbolChart, SymbolChartLoad};
