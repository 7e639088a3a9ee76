use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Deserialize;

use crate::config::Config;
use crate::error::AppError;
use crate::pipeline::aggregate::RouteAggregator;
use crate::pipeline::overview::build_overview;
use crate::state::AppState;
use crate::types::sample::RawSample;
use crate::types::summary::{Dashboard, TodayStats};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stats/today", get(today))
        .route("/api/stats/dashboard", get(dashboard))
        .route("/api/stats/summarize", post(summarize))
}

#[derive(Deserialize)]
struct SummarizeRequest {
    #[serde(default)]
    data: Vec<RawSample>,
    /// Reference instant in epoch milliseconds; defaults to the server clock.
    now: Option<i64>,
}

async fn today(State(state): State<AppState>) -> Result<Json<TodayStats>, AppError> {
    let samples = state.history().await?;
    let stats = aggregate(state.config(), &samples, Utc::now());

    tracing::info!(
        "Today: {} of {} samples, {:.2} km, {} trips",
        stats.sample_count,
        samples.len(),
        stats.summary.total_distance_km,
        stats.summary.trip_count
    );

    Ok(Json(stats))
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<Dashboard>, AppError> {
    let (samples, backend) = tokio::try_join!(state.history(), state.backend_stats())?;
    let today = aggregate(state.config(), &samples, Utc::now());
    let overview = build_overview(backend);

    tracing::info!(
        "Dashboard: {} activity types, {} anomalies, {} samples today",
        overview.activity_shares.len(),
        overview.anomaly_count,
        today.sample_count
    );

    Ok(Json(Dashboard { overview, today }))
}

async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<TodayStats>, AppError> {
    let now = match request.now {
        Some(ms) => Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
            AppError::BadRequest(format!("Reference time out of range: {}", ms))
        })?,
        None => Utc::now(),
    };

    Ok(Json(aggregate(state.config(), &request.data, now)))
}

fn aggregate(config: &Config, samples: &[RawSample], now: DateTime<Utc>) -> TodayStats {
    let settings = config.aggregator_settings();
    let stats = match config.utc_offset {
        Some(offset) => RouteAggregator::new(offset, settings).today(samples, now),
        None => RouteAggregator::new(Local, settings).today(samples, now),
    };
    stats.rounded()
}
