use serde::Serialize;

use super::{mounts, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Live,
    Disconnected,
}

/// The push channel's status field.
#[derive(Debug, Default)]
pub struct ConnectionIndicator {
    last: Option<ConnectionStatus>,
}

impl ConnectionIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update<S: Surface + ?Sized>(&mut self, status: ConnectionStatus, surface: &mut S) {
        self.last = Some(status);
        let html = match status {
            ConnectionStatus::Live => r#"<span style="color: var(--positive);">Live</span>"#,
            ConnectionStatus::Disconnected => {
                r#"<span style="color: var(--negative);">Disconnected</span>"#
            }
        };
        surface.set_html(mounts::CONNECTION_STATUS, html.to_string());
    }

    pub fn status(&self) -> Option<ConnectionStatus> {
        self.last
    }
}
