use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityCount {
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyCount {
    #[serde(default, alias = "is_anomaly")]
    pub is_anomaly: bool,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySpeed {
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(
        default,
        alias = "avg_speed",
        deserialize_with = "crate::types::sample::lenient_f64"
    )]
    pub avg_speed: f64,
    #[serde(default)]
    pub count: u64,
}

/// Body of `GET /stats` on the backend. Keys are accepted in snake_case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendStats {
    #[serde(default, alias = "activity_distribution")]
    pub activity_distribution: Vec<ActivityCount>,
    #[serde(default, alias = "anomaly_statistics")]
    pub anomaly_statistics: Vec<AnomalyCount>,
    #[serde(default, alias = "recent_activity")]
    pub recent_activity: Vec<ActivityCount>,
    #[serde(default, alias = "speed_by_activity")]
    pub speed_by_activity: Vec<ActivitySpeed>,
    #[serde(default, alias = "total_data_points")]
    pub total_data_points: u64,
    #[serde(default, alias = "generated_at")]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityShare {
    pub activity: String,
    pub count: u64,
    /// Share of all classified samples, 0-100 with one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    #[serde(flatten)]
    pub backend: BackendStats,
    pub activity_shares: Vec<ActivityShare>,
    pub anomaly_count: u64,
    pub average_speed_kmh: f64,
}
