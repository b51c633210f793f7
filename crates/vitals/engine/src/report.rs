//! Report shapes returned to callers, and the pure composition step that
//! turns a set of fetched events into a [`MetricsReport`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitals_types::{EventRecord, SystemHealth, Window};

use crate::aggregate::{Aggregator, BucketStats, GroupStats, OutcomeStats};
use crate::bucket::BucketPlan;
use crate::health::JobHealthReport;
use crate::surface::Surface;

/// Window-wide figures.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(flatten)]
    pub stats: OutcomeStats,
    /// Throughput over the whole window, two decimals.
    pub requests_per_minute: f64,
    /// Number of distinct dimension groups.
    pub dimensions: usize,
}

/// Time series, rankings and totals for one surface over one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub surface: String,
    pub window: Window,
    /// Instant the report was computed for.
    pub timestamp: DateTime<Utc>,
    pub time_series: Vec<BucketStats>,
    pub top_by_volume: Vec<GroupStats>,
    pub top_by_latency: Vec<GroupStats>,
    pub totals: Totals,
    /// Events counted in totals that fell outside every bucket.
    pub unbucketed: u64,
    /// The event fetch hit its cap; older events were not seen.
    pub truncated: bool,
}

/// Ranking parameters for [`compose_metrics_report`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rankings {
    pub top_n: usize,
    pub min_latency_samples: usize,
}

/// Aggregate `events` for `surface` over `window` ending at `now`.
pub fn compose_metrics_report<'e, S, I>(
    surface: &S,
    events: I,
    window: Window,
    now: DateTime<Utc>,
    rankings: Rankings,
    truncated: bool,
) -> MetricsReport
where
    S: Surface + ?Sized,
    I: IntoIterator<Item = &'e EventRecord>,
{
    let plan = BucketPlan::for_window(window, now);
    let mut aggregator = Aggregator::new(surface, &plan);
    aggregator.extend(events);
    let aggregation = aggregator.finish();

    let top_by_volume = aggregation.top_by_volume(rankings.top_n);
    let top_by_latency =
        aggregation.top_by_latency(rankings.top_n, rankings.min_latency_samples);
    let minutes = window.duration().num_minutes().max(1);
    let totals = Totals {
        requests_per_minute: per_minute(aggregation.totals.requests, minutes),
        dimensions: aggregation.groups.len(),
        stats: aggregation.totals,
    };

    MetricsReport {
        surface: surface.name().to_string(),
        window,
        timestamp: now,
        time_series: aggregation.buckets,
        top_by_volume,
        top_by_latency,
        totals,
        unbucketed: aggregation.unbucketed,
        truncated,
    }
}

fn per_minute(count: u64, minutes: i64) -> f64 {
    (count as f64 * 100.0 / minutes as f64).round() / 100.0
}

/// Client and server error counts for one bucket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorPoint {
    pub timestamp: DateTime<Utc>,
    /// 4xx responses.
    pub client_errors: u64,
    /// 5xx responses.
    pub server_errors: u64,
    pub total: u64,
}

/// Window-wide error counts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorTotals {
    pub requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    pub total: u64,
    pub error_rate: f64,
}

/// API error time series and totals for the operational view.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorSummary {
    pub time_series: Vec<ApiErrorPoint>,
    pub totals: ApiErrorTotals,
}

impl ApiErrorSummary {
    /// Derive error counts from a request-surface report.
    pub fn from_report(report: &MetricsReport) -> Self {
        let time_series = report
            .time_series
            .iter()
            .map(|bucket| ApiErrorPoint {
                timestamp: bucket.timestamp,
                client_errors: bucket.stats.errors.saturating_sub(bucket.stats.server_errors),
                server_errors: bucket.stats.server_errors,
                total: bucket.stats.errors,
            })
            .collect();
        let stats = &report.totals.stats;
        Self {
            time_series,
            totals: ApiErrorTotals {
                requests: stats.requests,
                client_errors: stats.errors.saturating_sub(stats.server_errors),
                server_errors: stats.server_errors,
                total: stats.errors,
                error_rate: stats.error_rate,
            },
        }
    }
}

/// Scheduled-job health, API errors and the overall verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalReport {
    pub window: Window,
    pub cron_jobs: Vec<JobHealthReport>,
    pub api_errors: ApiErrorSummary,
    pub overall_health: SystemHealth,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::RequestSurface;
    use chrono::TimeZone;

    const RANKINGS: Rankings = Rankings {
        top_n: 10,
        min_latency_samples: 5,
    };

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, 0).unwrap()
    }

    #[test]
    fn empty_window_is_well_formed() {
        let none: Vec<EventRecord> = Vec::new();
        let report = compose_metrics_report(
            &RequestSurface,
            &none,
            Window::OneHour,
            at(10, 0),
            RANKINGS,
            false,
        );
        assert_eq!(report.time_series.len(), 13);
        assert_eq!(report.totals, Totals::default());
        assert!(report.top_by_volume.is_empty());
        assert_eq!(report.surface, "requests");
    }

    #[test]
    fn throughput_is_per_minute_of_window() {
        let events: Vec<_> = (0..30)
            .map(|i| EventRecord::request(at(9, 30), "/api/health", "GET", 200, i))
            .collect();
        let report = compose_metrics_report(
            &RequestSurface,
            &events,
            Window::OneHour,
            at(10, 0),
            RANKINGS,
            false,
        );
        assert_eq!(report.totals.requests_per_minute, 0.5);
        assert_eq!(report.totals.dimensions, 1);
    }

    #[test]
    fn report_serializes_camel_case() {
        let events = vec![EventRecord::request(at(9, 58), "/api/games", "GET", 503, 120)];
        let report = compose_metrics_report(
            &RequestSurface,
            &events,
            Window::OneHour,
            at(10, 0),
            RANKINGS,
            true,
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["window"], "1h");
        assert_eq!(json["totals"]["serverErrors"], 1);
        assert_eq!(json["totals"]["requestsPerMinute"], 0.02);
        assert!(json["timeSeries"][0].get("avgDuration").is_some());
        assert_eq!(json["topByVolume"][0]["subDimensions"][0], "GET");
        assert_eq!(json["truncated"], true);
    }

    #[test]
    fn api_errors_split_client_and_server() {
        let events = vec![
            EventRecord::request(at(9, 50), "/a", "GET", 404, 1),
            EventRecord::request(at(9, 51), "/a", "GET", 502, 1),
            EventRecord::request(at(9, 52), "/a", "GET", 200, 1),
        ];
        let report = compose_metrics_report(
            &RequestSurface,
            &events,
            Window::OneHour,
            at(10, 0),
            RANKINGS,
            false,
        );
        let summary = ApiErrorSummary::from_report(&report);
        assert_eq!(summary.totals.client_errors, 1);
        assert_eq!(summary.totals.server_errors, 1);
        assert_eq!(summary.totals.total, 2);
        assert_eq!(summary.time_series.len(), report.time_series.len());
    }
}
