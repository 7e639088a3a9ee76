use crate::pipeline::aggregate::{round_to, RunningMean};
use crate::types::overview::{ActivityShare, BackendStats, DashboardOverview};

const UNKNOWN_ACTIVITY: &str = "unknown";

/// Adds the figures the statistics screen derives from the backend's `/stats` body.
pub fn build_overview(backend: BackendStats) -> DashboardOverview {
    let activity_shares = activity_shares(&backend);

    let anomaly_count = backend
        .anomaly_statistics
        .iter()
        .filter(|a| a.is_anomaly)
        .map(|a| a.count)
        .sum();

    let mut speed = RunningMean::default();
    for entry in &backend.speed_by_activity {
        speed.push(entry.avg_speed);
    }

    DashboardOverview {
        activity_shares,
        anomaly_count,
        average_speed_kmh: round_to(speed.value(), 1),
        backend,
    }
}

/// Activity distribution ordered by count, largest first, with percentages of the total.
fn activity_shares(backend: &BackendStats) -> Vec<ActivityShare> {
    let total: u64 = backend.activity_distribution.iter().map(|a| a.count).sum();

    let mut shares: Vec<ActivityShare> = backend
        .activity_distribution
        .iter()
        .map(|a| {
            let percentage = if total > 0 {
                a.count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            ActivityShare {
                activity: a.activity.clone().unwrap_or_else(|| UNKNOWN_ACTIVITY.to_string()),
                count: a.count,
                percentage: round_to(percentage, 1),
            }
        })
        .collect();

    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::overview::{ActivityCount, ActivitySpeed, AnomalyCount};

    fn count(activity: &str, count: u64) -> ActivityCount {
        ActivityCount {
            activity: Some(activity.to_string()),
            count,
        }
    }

    #[test]
    fn shares_are_sorted_and_sum_to_hundred() {
        let backend = BackendStats {
            activity_distribution: vec![count("walking", 1), count("car", 3)],
            ..BackendStats::default()
        };

        let overview = build_overview(backend);
        assert_eq!(overview.activity_shares[0].activity, "car");
        assert_eq!(overview.activity_shares[0].percentage, 75.0);
        assert_eq!(overview.activity_shares[1].percentage, 25.0);
    }

    #[test]
    fn empty_backend_stats() {
        let overview = build_overview(BackendStats::default());
        assert!(overview.activity_shares.is_empty());
        assert_eq!(overview.anomaly_count, 0);
        assert_eq!(overview.average_speed_kmh, 0.0);
    }

    #[test]
    fn anomalies_and_mean_speed() {
        let backend = BackendStats {
            anomaly_statistics: vec![
                AnomalyCount { is_anomaly: false, count: 90 },
                AnomalyCount { is_anomaly: true, count: 4 },
            ],
            speed_by_activity: vec![
                ActivitySpeed { activity: Some("walking".into()), avg_speed: 4.5, count: 10 },
                ActivitySpeed { activity: Some("car".into()), avg_speed: 40.0, count: 5 },
            ],
            ..BackendStats::default()
        };

        let overview = build_overview(backend);
        assert_eq!(overview.anomaly_count, 4);
        assert_eq!(overview.average_speed_kmh, 22.3);
    }
}
