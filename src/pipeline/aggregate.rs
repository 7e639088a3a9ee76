use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, LocalResult, NaiveTime, Offset, TimeZone, Timelike, Utc};

use crate::pipeline::geo::haversine_km;
use crate::types::sample::{finite_or_zero, RawSample};
use crate::types::summary::{DailySummary, HourlySpeedPoint, TodayStats};

pub const DEFAULT_TRIP_GAP_MS: i64 = 10 * 60 * 1000;
pub const DEFAULT_MOVING_SPEED_KMH: f64 = 1.0;

const UNKNOWN_ACTIVITY: &str = "unknown";
const HOURS_PER_DAY: usize = 24;
const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorSettings {
    /// A gap strictly larger than this starts a new trip.
    pub trip_gap_ms: i64,
    /// Samples strictly faster than this count as moving.
    pub moving_speed_kmh: f64,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            trip_gap_ms: DEFAULT_TRIP_GAP_MS,
            moving_speed_kmh: DEFAULT_MOVING_SPEED_KMH,
        }
    }
}

/// Derives the daily statistics from raw GPS samples.
///
/// Calendar days and hours of day are evaluated in `Tz`. Every method is
/// pure: the same samples always give the same result.
#[derive(Debug, Clone)]
pub struct RouteAggregator<Tz: TimeZone> {
    tz: Tz,
    settings: AggregatorSettings,
}

impl<Tz: TimeZone> RouteAggregator<Tz> {
    pub fn new(tz: Tz, settings: AggregatorSettings) -> Self {
        Self { tz, settings }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Keeps samples at or after local midnight of `now`. Later timestamps are not capped.
    pub fn filter_today(&self, samples: &[RawSample], now: DateTime<Utc>) -> Vec<RawSample> {
        let cutoff = self.start_of_day_ms(now);
        samples
            .iter()
            .filter(|s| s.timestamp_ms >= cutoff)
            .cloned()
            .collect()
    }

    pub fn summarize(&self, samples: &[RawSample]) -> DailySummary {
        if samples.is_empty() {
            return DailySummary::empty();
        }

        // Legs follow input order; the samples are not re-sorted.
        let total_distance_km = samples
            .windows(2)
            .map(|pair| haversine_km(pair[0].coordinates(), pair[1].coordinates()))
            .map(finite_or_zero)
            .sum::<f64>();

        let first = samples.iter().map(|s| s.timestamp_ms).min().unwrap_or(0);
        let last = samples.iter().map(|s| s.timestamp_ms).max().unwrap_or(0);
        let span_ms = last.saturating_sub(first).max(0) as u64;
        let total_duration_min = span_ms.div_ceil(MS_PER_MINUTE).max(1);

        let mut moving = RunningMean::default();
        samples
            .iter()
            .map(RawSample::speed)
            .filter(|speed| *speed > 0.0)
            .for_each(|speed| moving.push(speed));
        let average_speed_kmh = moving.value();

        DailySummary {
            total_distance_km,
            total_duration_min,
            dominant_activity: dominant_activity(samples),
            average_speed_kmh,
            trip_count: self.count_trips(samples).max(1),
        }
    }

    /// Mean speed per local hour, always 24 entries from `00:00` to `23:00`.
    pub fn hourly_speeds(&self, samples: &[RawSample]) -> Vec<HourlySpeedPoint> {
        let mut buckets = [RunningMean::default(); HOURS_PER_DAY];
        for sample in samples {
            buckets[self.local_hour(sample.timestamp_ms)].push(sample.speed());
        }

        buckets
            .iter()
            .enumerate()
            .map(|(hour, bucket)| HourlySpeedPoint {
                hour_label: format!("{:02}:00", hour),
                average_speed_kmh: round_to(bucket.value(), 1),
            })
            .collect()
    }

    pub fn max_speed(&self, samples: &[RawSample]) -> f64 {
        samples.iter().map(RawSample::speed).fold(0.0, f64::max)
    }

    pub fn active_hour_count(&self, samples: &[RawSample]) -> usize {
        samples
            .iter()
            .map(|s| self.local_hour(s.timestamp_ms))
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Share of moving samples as a rounded percentage.
    pub fn moving_ratio(&self, samples: &[RawSample]) -> u8 {
        if samples.is_empty() {
            return 0;
        }
        let moving = samples
            .iter()
            .filter(|s| s.speed() > self.settings.moving_speed_kmh)
            .count();
        ((moving as f64 / samples.len() as f64) * 100.0).round() as u8
    }

    /// Restricts `samples` to the current day and computes every metric on the result.
    pub fn today(&self, samples: &[RawSample], now: DateTime<Utc>) -> TodayStats {
        let today = self.filter_today(samples, now);
        tracing::debug!(
            received = samples.len(),
            kept = today.len(),
            "Aggregating today's samples"
        );

        TodayStats {
            summary: self.summarize(&today),
            hourly: self.hourly_speeds(&today),
            max_speed_kmh: self.max_speed(&today),
            active_hours: self.active_hour_count(&today),
            moving_ratio: self.moving_ratio(&today),
            sample_count: today.len(),
            generated_at: now,
        }
    }

    fn count_trips(&self, samples: &[RawSample]) -> u32 {
        let mut trips = 0;
        let mut prev: Option<i64> = None;
        for sample in samples {
            let new_trip = match prev {
                None => true,
                Some(prev_ts) => {
                    sample.timestamp_ms.saturating_sub(prev_ts) > self.settings.trip_gap_ms
                }
            };
            if new_trip {
                trips += 1;
            }
            prev = Some(sample.timestamp_ms);
        }
        trips
    }

    fn start_of_day_ms(&self, now: DateTime<Utc>) -> i64 {
        let local = now.with_timezone(&self.tz);
        let midnight = local.date_naive().and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(dt) => dt.timestamp_millis(),
            LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
            // Midnight skipped by a DST jump: use the offset in effect at `now`.
            LocalResult::None => {
                let offset_secs = local.offset().fix().local_minus_utc() as i64;
                midnight.and_utc().timestamp_millis() - offset_secs * 1000
            }
        }
    }

    fn local_hour(&self, timestamp_ms: i64) -> usize {
        let utc = Utc.timestamp_millis_opt(timestamp_ms).single().unwrap_or_default();
        utc.with_timezone(&self.tz).hour() as usize
    }
}

/// Most frequent activity. On a tie, the one first seen in the input wins.
fn dominant_activity(samples: &[RawSample]) -> String {
    let mut order: Vec<(&str, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in samples {
        let activity = sample.activity.as_deref().unwrap_or(UNKNOWN_ACTIVITY);
        match index.get(activity) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(activity, order.len());
                order.push((activity, 1));
            }
        }
    }

    let mut best: Option<(&str, u32)> = None;
    for &(activity, count) in &order {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((activity, count));
        }
    }

    best.map(|(activity, _)| activity)
        .unwrap_or(UNKNOWN_ACTIVITY)
        .to_string()
}

/// Incremental mean; stays finite where summing first would overflow.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RunningMean {
    mean: f64,
    count: u32,
}

impl RunningMean {
    pub(crate) fn push(&mut self, value: f64) {
        self.count += 1;
        let n = self.count as f64;
        // Subtract before adding so opposite-signed extremes cannot overflow.
        self.mean = self.mean - self.mean / n + value / n;
    }

    pub(crate) fn value(&self) -> f64 {
        finite_or_zero(self.mean)
    }
}

/// Rounds to `decimals` places. Values too large to scale are returned as they are.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        finite_or_zero(value)
    }
}
