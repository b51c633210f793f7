//! Property tests: statistics, bucketing and aggregation invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use vitals_engine::types::{EventRecord, Window};
use vitals_engine::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

/// An instant within ~60 days of the base.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..60 * 24 * 3_600_000).prop_map(|ms| base() + Duration::milliseconds(ms))
}

fn arb_window() -> impl Strategy<Value = Window> {
    prop_oneof![
        Just(Window::OneHour),
        Just(Window::TwentyFourHours),
        Just(Window::SevenDays),
        Just(Window::FourteenDays),
        Just(Window::ThirtyDays),
    ]
}

/// Request events with offsets inside `[0, span_ms]` before `now`.
fn arb_requests(
    now: DateTime<Utc>,
    span_ms: i64,
) -> impl Strategy<Value = Vec<EventRecord>> {
    prop::collection::vec(
        (
            0..=span_ms,
            prop_oneof![Just("/api/games"), Just("/api/users"), Just("/api/disputes")],
            prop_oneof![Just(200u16), Just(201), Just(404), Just(500), Just(503)],
            0u64..5_000,
        ),
        0..200,
    )
    .prop_map(move |rows| {
        rows.into_iter()
            .map(|(offset, route, status, duration)| {
                EventRecord::request(
                    now - Duration::milliseconds(offset),
                    route,
                    "GET",
                    status,
                    duration,
                )
            })
            .collect()
    })
}

const RANKINGS: Rankings = Rankings {
    top_n: 10,
    min_latency_samples: 5,
};

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// The percentile is always one of the samples and is monotone in p.
    #[test]
    fn percentile_is_an_observed_sample(
        samples in prop::collection::vec(0u64..100_000, 1..100),
        p in 0.0f64..=100.0,
    ) {
        let value = percentile(&samples, p);
        prop_assert!(samples.contains(&value));
        prop_assert!(percentile(&samples, p) <= percentile(&samples, 100.0));
        prop_assert!(percentile(&samples, 0.0) <= value);
    }

    /// Matches the nearest-rank definition computed in integer arithmetic.
    #[test]
    fn percentile_matches_nearest_rank(
        samples in prop::collection::vec(0u64..100_000, 0..100),
        p in 0u32..=100,
    ) {
        let mut sorted = samples.clone();
        sorted.sort_unstable();
        let n = sorted.len();
        let expected = if n == 0 {
            0
        } else {
            let rank = (p as usize * n).div_ceil(100).max(1);
            sorted[rank - 1]
        };
        prop_assert_eq!(percentile(&samples, f64::from(p)), expected);
    }

    /// Same input, same answer, regardless of sample order.
    #[test]
    fn percentile_ignores_input_order(
        mut samples in prop::collection::vec(0u64..10_000, 0..50),
        p in 0.0f64..=100.0,
    ) {
        let forward = percentile(&samples, p);
        samples.reverse();
        prop_assert_eq!(forward, percentile(&samples, p));
    }

    /// The plan starts at or before the window start and its last bucket holds `now`.
    #[test]
    fn plan_covers_window(now in arb_instant(), window in arb_window()) {
        let plan = BucketPlan::for_window(window, now);
        let range = window.range_ending_at(now);
        let keys = plan.keys();
        prop_assert!(!keys.is_empty());
        prop_assert!(keys[0] <= range.start);
        let last = keys[keys.len() - 1];
        prop_assert!(last <= now && now < last + plan.width());
        for pair in keys.windows(2) {
            prop_assert_eq!(pair[1] - pair[0], plan.width());
        }
    }

    /// Overlapping windows agree on every shared boundary.
    #[test]
    fn plans_share_boundaries(
        now in arb_instant(),
        shift_ms in 0i64..3 * 3_600_000,
        window in arb_window(),
    ) {
        let earlier = BucketPlan::for_window(window, now);
        let later = BucketPlan::for_window(window, now + Duration::milliseconds(shift_ms));
        let later_keys: std::collections::BTreeSet<_> = later.keys().iter().copied().collect();
        for key in earlier.keys() {
            if *key >= later.keys()[0] {
                prop_assert!(later_keys.contains(key));
            }
        }
    }

    /// Every in-window event lands in exactly one bucket and one group.
    #[test]
    fn aggregation_conserves_counts(
        events in arb_requests(base() + Duration::days(3), 3_600_000),
    ) {
        let now = base() + Duration::days(3);
        let report = compose_metrics_report(
            &RequestSurface,
            &events,
            Window::OneHour,
            now,
            RANKINGS,
            false,
        );
        let total = events.len() as u64;
        let bucketed: u64 = report.time_series.iter().map(|b| b.stats.requests).sum();
        let grouped: u64 = report.top_by_volume.iter().map(|g| g.stats.requests).sum();
        prop_assert_eq!(report.totals.stats.requests, total);
        prop_assert_eq!(bucketed, total);
        prop_assert_eq!(grouped, total);
        prop_assert_eq!(report.unbucketed, 0);

        let errors: u64 = report.time_series.iter().map(|b| b.stats.errors).sum();
        prop_assert_eq!(errors, report.totals.stats.errors);
        prop_assert!(report.totals.stats.server_errors <= report.totals.stats.errors);
    }

    /// Groups below the sample floor never appear in the latency ranking.
    #[test]
    fn low_sample_groups_are_not_ranked(
        events in arb_requests(base() + Duration::days(1), 3_600_000),
        floor in 1usize..20,
    ) {
        let now = base() + Duration::days(1);
        let report = compose_metrics_report(
            &RequestSurface,
            &events,
            Window::OneHour,
            now,
            Rankings { top_n: 10, min_latency_samples: floor },
            false,
        );
        for group in &report.top_by_latency {
            prop_assert!(group.stats.requests >= floor as u64);
        }
        for pair in report.top_by_latency.windows(2) {
            prop_assert!(pair[0].stats.p95 >= pair[1].stats.p95);
        }
    }
}
