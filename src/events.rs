use tokio::sync::mpsc;

use crate::models::{RankingEntry, StatsSummary, TradeEvent};
use crate::render::ConnectionStatus;

/// Everything a producer can hand to the render task.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Trade(TradeEvent),
    Rankings(Vec<RankingEntry>),
    Stats(StatsSummary),
    Connection(ConnectionStatus),
}

impl UiEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::Trade(_) => "trade",
            UiEvent::Rankings(_) => "rankings",
            UiEvent::Stats(_) => "stats",
            UiEvent::Connection(_) => "connection",
        }
    }
}

/// Where producers deliver events. Injected into the push channel and the
/// poll loop so neither knows who renders.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: UiEvent);
}

impl EventSink for mpsc::UnboundedSender<UiEvent> {
    fn deliver(&self, event: UiEvent) {
        if let Err(e) = self.send(event) {
            tracing::debug!(kind = e.0.kind(), "Render queue closed, event dropped");
        }
    }
}

impl<T: EventSink + ?Sized> EventSink for std::sync::Arc<T> {
    fn deliver(&self, event: UiEvent) {
        (**self).deliver(event)
    }
}
