//! Time-bucketing: partition a window into fixed-width, epoch-aligned buckets.
//!
//! Bucket keys are aligned to multiples of the width since the Unix epoch, not
//! to the window start. Two overlapping queries therefore agree on every
//! boundary in the region they share.

use chrono::{DateTime, Duration, Utc};
use vitals_types::{TimeRange, Window};

/// Epoch-aligned key of the bucket containing `instant`.
pub fn bucket_key(instant: DateTime<Utc>, width: Duration) -> DateTime<Utc> {
    let width_ms = width.num_milliseconds().max(1);
    let aligned = instant.timestamp_millis().div_euclid(width_ms) * width_ms;
    DateTime::from_timestamp_millis(aligned).unwrap_or(instant)
}

/// The ordered bucket keys covering `[start, now]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BucketPlan {
    width: Duration,
    keys: Vec<DateTime<Utc>>,
}

impl BucketPlan {
    /// Plan buckets for `[start, now]`.
    ///
    /// The first key is `<= start`, the last bucket contains `now`, and a
    /// degenerate window (`start == now`) still yields one bucket. A start
    /// after `now` is treated as `now`.
    pub fn new(start: DateTime<Utc>, now: DateTime<Utc>, width: Duration) -> Self {
        let width = if width <= Duration::zero() {
            Duration::milliseconds(1)
        } else {
            width
        };
        let start = start.min(now);
        let mut keys = Vec::new();
        let mut key = bucket_key(start, width);
        while key <= now {
            keys.push(key);
            key += width;
        }
        Self { width, keys }
    }

    /// Plan buckets for `window` ending at `now`, using the window's width.
    pub fn for_window(window: Window, now: DateTime<Utc>) -> Self {
        let range = window.range_ending_at(now);
        Self::new(range.start, range.end, window.bucket_width())
    }

    pub fn width(&self) -> Duration {
        self.width
    }

    pub fn keys(&self) -> &[DateTime<Utc>] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Range spanned by the plan: first key to the end of the last bucket.
    pub fn span(&self) -> Option<TimeRange> {
        let first = *self.keys.first()?;
        let last = *self.keys.last()?;
        Some(TimeRange::new(first, last + self.width - Duration::milliseconds(1)))
    }

    /// Index of the bucket containing `instant`, if it is inside the plan.
    pub fn index_of(&self, instant: DateTime<Utc>) -> Option<usize> {
        let first = *self.keys.first()?;
        let key = bucket_key(instant, self.width);
        if key < first {
            return None;
        }
        let offset = (key - first).num_milliseconds() / self.width.num_milliseconds();
        let index = usize::try_from(offset).ok()?;
        (index < self.keys.len()).then_some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, h, m, s).unwrap()
    }

    #[test]
    fn key_is_epoch_aligned() {
        let five = Duration::minutes(5);
        assert_eq!(bucket_key(at(1, 12, 59), five), at(1, 10, 0));
        assert_eq!(bucket_key(at(1, 10, 0), five), at(1, 10, 0));
        assert_eq!(bucket_key(at(13, 59, 59), Duration::hours(1)), at(13, 0, 0));
        assert_eq!(bucket_key(at(13, 59, 59), Duration::days(1)), at(0, 0, 0));
    }

    #[test]
    fn key_floors_before_epoch() {
        let before = Utc.with_ymd_and_hms(1969, 12, 31, 23, 58, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(1969, 12, 31, 23, 55, 0).unwrap();
        assert_eq!(bucket_key(before, Duration::minutes(5)), expected);
    }

    #[test]
    fn one_hour_plan_has_thirteen_buckets_when_unaligned() {
        let now = at(1, 15, 30);
        let plan = BucketPlan::for_window(Window::OneHour, now);
        // start 00:15:30 -> key 00:15; keys 00:15 .. 01:15 inclusive
        assert_eq!(plan.len(), 13);
        assert_eq!(plan.keys()[0], at(0, 15, 0));
        assert_eq!(*plan.keys().last().unwrap(), at(1, 15, 0));
    }

    #[test]
    fn first_key_not_after_start_and_last_contains_now() {
        let now = at(17, 42, 11);
        for window in Window::ALL {
            let plan = BucketPlan::for_window(window, now);
            let range = window.range_ending_at(now);
            assert!(plan.keys()[0] <= range.start, "{window}");
            let last = *plan.keys().last().unwrap();
            assert!(last <= now && now < last + plan.width(), "{window}");
        }
    }

    #[test]
    fn degenerate_window_yields_one_bucket() {
        let now = at(8, 3, 0);
        let plan = BucketPlan::new(now, now, Duration::minutes(5));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.keys()[0], at(8, 0, 0));
    }

    #[test]
    fn start_after_now_is_clamped() {
        let now = at(8, 3, 0);
        let plan = BucketPlan::new(now + Duration::hours(2), now, Duration::minutes(5));
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn keys_are_contiguous() {
        let plan = BucketPlan::for_window(Window::TwentyFourHours, at(12, 30, 0));
        for pair in plan.keys().windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::hours(1));
        }
    }

    #[test]
    fn index_of_maps_in_range_instants() {
        let now = at(1, 15, 0);
        let plan = BucketPlan::new(at(0, 15, 0), now, Duration::minutes(5));
        assert_eq!(plan.index_of(at(0, 15, 0)), Some(0));
        assert_eq!(plan.index_of(at(0, 19, 59)), Some(0));
        assert_eq!(plan.index_of(at(1, 10, 0)), Some(11));
        assert_eq!(plan.index_of(at(1, 15, 0)), Some(12));
        assert_eq!(plan.index_of(at(0, 0, 0)), None);
        assert_eq!(plan.index_of(at(1, 20, 0)), None);
    }

    #[test]
    fn span_covers_all_buckets() {
        let plan = BucketPlan::new(at(0, 15, 0), at(0, 25, 0), Duration::minutes(5));
        let span = plan.span().unwrap();
        assert_eq!(span.start, at(0, 15, 0));
        assert!(span.contains(at(0, 29, 59)));
        assert!(!span.contains(at(0, 30, 0)));
    }
}
