use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::aggregate::round_to;
use crate::types::overview::DashboardOverview;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub total_distance_km: f64,
    pub total_duration_min: u64,
    pub dominant_activity: String,
    pub average_speed_kmh: f64,
    pub trip_count: u32,
}

impl DailySummary {
    /// Summary reported for a day without samples.
    pub fn empty() -> Self {
        Self {
            total_distance_km: 0.0,
            total_duration_min: 1,
            dominant_activity: "stationary".to_string(),
            average_speed_kmh: 0.0,
            trip_count: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySpeedPoint {
    pub hour_label: String,
    pub average_speed_kmh: f64,
}

/// Everything the statistics screen shows for the current day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub summary: DailySummary,
    pub hourly: Vec<HourlySpeedPoint>,
    pub max_speed_kmh: f64,
    pub active_hours: usize,
    pub moving_ratio: u8,
    pub sample_count: usize,
    pub generated_at: DateTime<Utc>,
}

impl TodayStats {
    /// Rounds to the precision the dashboard shows: distance to 0.01 km, speeds to 0.1 km/h.
    /// Hourly points are already at 0.1 km/h.
    pub fn rounded(mut self) -> Self {
        self.summary.total_distance_km = round_to(self.summary.total_distance_km, 2);
        self.summary.average_speed_kmh = round_to(self.summary.average_speed_kmh, 1);
        self.max_speed_kmh = round_to(self.max_speed_kmh, 1);
        self
    }
}

/// Backend-wide statistics next to today's figures, as shown on the statistics screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub overview: DashboardOverview,
    pub today: TodayStats,
}
