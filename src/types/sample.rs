use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One GPS fix as reported by the tracking backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lon: f64,
    #[serde(rename = "speed", default, deserialize_with = "lenient_f64")]
    pub speed_kmh: f64,
    #[serde(rename = "timestamp", default, deserialize_with = "lenient_i64")]
    pub timestamp_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl RawSample {
    pub fn new(lat: f64, lon: f64, speed_kmh: f64, timestamp_ms: i64) -> Self {
        Self {
            lat,
            lon,
            speed_kmh,
            timestamp_ms,
            activity: None,
        }
    }

    pub fn with_activity(mut self, activity: &str) -> Self {
        self.activity = Some(activity.to_string());
        self
    }

    /// Speed with non-finite values replaced by zero.
    pub fn speed(&self) -> f64 {
        finite_or_zero(self.speed_kmh)
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (finite_or_zero(self.lat), finite_or_zero(self.lon))
    }
}

/// Body shape of `GET /history` on the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub data: Vec<RawSample>,
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn lenient_number(value: Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(finite_or_zero(lenient_number(value)))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let ms = match &value {
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    Ok(ms.unwrap_or_else(|| finite_or_zero(lenient_number(value)) as i64))
}
