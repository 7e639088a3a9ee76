use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::types::overview::BackendStats;
use crate::types::sample::{HistoryResponse, RawSample};

/// Client for the tracking backend's `/history` and `/stats` endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    pub async fn fetch_history(&self, url: &str) -> Result<Vec<RawSample>, FetchError> {
        let history: HistoryResponse = self.get_json(url).await?;
        tracing::info!("Fetched {} samples from {}", history.data.len(), url);
        Ok(history.data)
    }

    pub async fn fetch_stats(&self, url: &str) -> Result<BackendStats, FetchError> {
        let stats: BackendStats = self.get_json(url).await?;
        tracing::info!(
            "Fetched backend stats from {} ({} data points)",
            url,
            stats.total_data_points
        );
        Ok(stats)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
