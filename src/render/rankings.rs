use super::format::{bot_link, escape_html, gain_class, signed_money};
use super::{mounts, Surface};
use crate::models::RankingEntry;

/// Rows shown by the compact leaderboard.
pub const MINI_LEADERBOARD_ROWS: usize = 5;

const EMPTY_ROW_HTML: &str = concat!(
    r#"<tr><td colspan="2" class="empty-state" style="text-align: center; color: var(--muted); padding: 40px;">"#,
    "No bots yet",
    "</td></tr>",
);

/// Compact leaderboard table body. Each update replaces the whole table.
#[derive(Debug)]
pub struct RankingsRenderer {
    rows: usize,
    shown: usize,
}

impl RankingsRenderer {
    pub fn new() -> Self {
        Self::with_rows(MINI_LEADERBOARD_ROWS)
    }

    pub fn with_rows(rows: usize) -> Self {
        Self { rows, shown: 0 }
    }

    /// Render the first rows of an already-sorted ranking.
    pub fn update<S: Surface + ?Sized>(&mut self, rankings: &[RankingEntry], surface: &mut S) {
        let top = &rankings[..rankings.len().min(self.rows)];
        self.shown = top.len();

        if top.is_empty() {
            surface.set_html(mounts::MINI_LEADERBOARD, EMPTY_ROW_HTML.to_string());
            return;
        }

        let html: String = top.iter().map(render_row).collect();
        surface.set_html(mounts::MINI_LEADERBOARD, html);
    }

    /// Number of ranking rows currently displayed (0 when the placeholder is
    /// shown).
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Default for RankingsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_row(entry: &RankingEntry) -> String {
    format!(
        r#"<tr><td><a href="{href}">{name}</a></td><td class="{class}">{pnl}</td></tr>"#,
        href = bot_link(&entry.bot_id),
        name = escape_html(&entry.bot_name),
        class = gain_class(entry.pnl),
        pnl = signed_money(entry.pnl),
    )
}
