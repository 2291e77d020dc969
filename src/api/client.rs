use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use super::types::{CandleHistory, LeaderboardResponse};
use crate::errors::ClientError;
use crate::models::{BotDetail, Candle, RankingEntry, StatsSummary};

/// Typed client for the dashboard's JSON API, rooted at the page origin.
#[derive(Debug, Clone)]
pub struct DashboardApi {
    http: Client,
    base_url: Url,
}

impl DashboardApi {
    pub fn new(http: Client, origin: Url) -> Self {
        Self {
            http,
            base_url: origin,
        }
    }

    /// `GET /api/leaderboard?limit=N`
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<RankingEntry>, ClientError> {
        let mut url = self.endpoint(&["api", "leaderboard"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let resp: LeaderboardResponse = self.get_json(url).await?;
        Ok(resp.rankings)
    }

    /// `GET /api/stats`
    pub async fn stats(&self) -> Result<StatsSummary, ClientError> {
        let url = self.endpoint(&["api", "stats"])?;
        self.get_json(url).await
    }

    /// `GET /api/bots/{bot_id}?limit=N`
    pub async fn bot_detail(&self, bot_id: &str, limit: usize) -> Result<BotDetail, ClientError> {
        let mut url = self.endpoint(&["api", "bots", bot_id])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    /// `GET /api/market/history/{symbol}?timeframe=T&days=D`
    pub async fn candles(
        &self,
        symbol: &str,
        timeframe: &str,
        days: u32,
    ) -> Result<Vec<Candle>, ClientError> {
        let mut url = self.endpoint(&["api", "market", "history", symbol])?;
        url.query_pairs_mut()
            .append_pair("timeframe", timeframe)
            .append_pair("days", &days.to_string());
        let resp: CandleHistory = self.get_json(url).await?;
        Ok(resp.candles)
    }

    /// Origin with `segments` as the path; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .clear()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        tracing::debug!(url = %url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
