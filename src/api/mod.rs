pub mod client;
pub mod types;
pub mod ws_types;

pub use client::DashboardApi;
