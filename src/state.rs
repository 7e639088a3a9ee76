use crate::config::Config;
use crate::error::FetchError;
use crate::pipeline::fetch::BackendClient;
use crate::types::overview::BackendStats;
use crate::types::sample::RawSample;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: BackendClient,
    cache: Arc<DashMap<String, CachedSnapshot>>,
    // Serializes cache refreshes so concurrent polls share one backend fetch.
    refresh: Arc<Mutex<()>>,
}

struct CachedSnapshot {
    samples: Arc<Vec<RawSample>>,
    fetched_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let client = BackendClient::new(config.request_timeout)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            cache: Arc::new(DashMap::new()),
            refresh: Arc::new(Mutex::new(())),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the backend history, reusing a snapshot younger than the cache TTL.
    pub async fn history(&self) -> Result<Arc<Vec<RawSample>>, FetchError> {
        let url = self.config.history_url();
        let ttl = self.config.cache_ttl;

        if let Some(samples) = self.get_fresh(&url, ttl) {
            tracing::debug!("History cache hit for {}", url);
            return Ok(samples);
        }

        let _guard = self.refresh.lock().await;
        // Another request may have refreshed while we waited.
        if let Some(samples) = self.get_fresh(&url, ttl) {
            tracing::debug!("History refreshed by a concurrent request for {}", url);
            return Ok(samples);
        }

        let samples = Arc::new(self.client.fetch_history(&url).await?);
        self.cache.insert(
            url,
            CachedSnapshot {
                samples: samples.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(samples)
    }

    /// Backend-wide statistics. Not cached; the dashboard requests them on refresh only.
    pub async fn backend_stats(&self) -> Result<BackendStats, FetchError> {
        self.client.fetch_stats(&self.config.stats_url()).await
    }

    fn get_fresh(&self, url: &str, ttl: Duration) -> Option<Arc<Vec<RawSample>>> {
        self.cache
            .get(url)
            .filter(|entry| entry.fetched_at.elapsed() < ttl)
            .map(|entry| entry.samples.clone())
    }

    pub fn evict_expired(&self, ttl: Duration) {
        let now = Instant::now();
        self.cache.retain(|_, cached| {
            now.duration_since(cached.fetched_at) < ttl
        });
        tracing::info!("Cache eviction complete. Current size: {}", self.cache.len());
    }
}
