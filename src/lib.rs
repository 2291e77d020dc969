pub mod api;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod events;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod narrative;
pub mod render;
pub mod services;
pub mod timescale;

pub use api::DashboardApi;
pub use config::ClientConfig;
pub use errors::ClientError;
pub use events::{EventSink, UiEvent};
