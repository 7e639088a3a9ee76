use std::time::Duration;

use chrono::FixedOffset;

use crate::pipeline::aggregate::{AggregatorSettings, DEFAULT_MOVING_SPEED_KMH, DEFAULT_TRIP_GAP_MS};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    pub history_limit: usize,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub trip_gap: Duration,
    pub moving_speed_kmh: f64,
    /// Fixed offset for day and hour boundaries; `None` uses the system zone.
    pub utc_offset: Option<FixedOffset>,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_parse("PORT").unwrap_or(3000);

        let backend_url = std::env::var("BACKEND_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "http://localhost:5000".to_string());

        let history_limit = env_parse("HISTORY_LIMIT").unwrap_or(100);

        let request_timeout_ms = env_parse("REQUEST_TIMEOUT_MS").unwrap_or(5000);

        let cache_ttl_seconds = env_parse("CACHE_TTL_SECONDS").unwrap_or(5);

        let trip_gap = env_parse("TRIP_GAP_MINUTES")
            .and_then(minutes_to_duration)
            .unwrap_or(Duration::from_millis(DEFAULT_TRIP_GAP_MS as u64));

        let moving_speed_kmh = env_parse::<f64>("MOVING_SPEED_KMH")
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(DEFAULT_MOVING_SPEED_KMH);

        let utc_offset = env_parse::<i32>("UTC_OFFSET_MINUTES")
            .and_then(offset_from_minutes);

        Self {
            port,
            backend_url,
            history_limit,
            request_timeout: Duration::from_millis(request_timeout_ms),
            cache_ttl: Duration::from_secs(cache_ttl_seconds),
            trip_gap,
            moving_speed_kmh,
            utc_offset,
        }
    }

    pub fn aggregator_settings(&self) -> AggregatorSettings {
        AggregatorSettings {
            trip_gap_ms: i64::try_from(self.trip_gap.as_millis()).unwrap_or(i64::MAX),
            moving_speed_kmh: self.moving_speed_kmh,
        }
    }

    pub fn history_url(&self) -> String {
        format!("{}/history?limit={}", self.backend_url, self.history_limit)
    }

    pub fn stats_url(&self) -> String {
        format!("{}/stats", self.backend_url)
    }
}

fn minutes_to_duration(minutes: u64) -> Option<Duration> {
    minutes.checked_mul(60).map(Duration::from_secs)
}

fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_trip_gap_is_rejected() {
        assert_eq!(minutes_to_duration(10), Some(Duration::from_secs(600)));
        assert_eq!(minutes_to_duration(u64::MAX), None);
    }

    #[test]
    fn oversized_offset_is_rejected() {
        assert_eq!(offset_from_minutes(420), FixedOffset::east_opt(7 * 3600));
        assert_eq!(offset_from_minutes(i32::MAX), None);
        assert_eq!(offset_from_minutes(24 * 60), None);
    }
}
