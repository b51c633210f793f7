//! Query windows and time ranges.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Caller-selected look-back for a telemetry query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "24h")]
    TwentyFourHours,
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "14d")]
    FourteenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl Window {
    /// All supported windows, shortest first.
    pub const ALL: [Window; 5] = [
        Window::OneHour,
        Window::TwentyFourHours,
        Window::SevenDays,
        Window::FourteenDays,
        Window::ThirtyDays,
    ];

    /// Length of the look-back.
    pub fn duration(&self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::TwentyFourHours => Duration::hours(24),
            Self::SevenDays => Duration::days(7),
            Self::FourteenDays => Duration::days(14),
            Self::ThirtyDays => Duration::days(30),
        }
    }

    /// Width of one time-series bucket for this window.
    pub fn bucket_width(&self) -> Duration {
        match self {
            Self::OneHour => Duration::minutes(5),
            Self::TwentyFourHours => Duration::hours(1),
            Self::SevenDays | Self::FourteenDays | Self::ThirtyDays => Duration::days(1),
        }
    }

    /// The range `[now - duration, now]`.
    pub fn range_ending_at(&self, now: DateTime<Utc>) -> TimeRange {
        TimeRange::new(now - self.duration(), now)
    }

    /// Short selector string (`"1h"`, `"24h"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::TwentyFourHours => "24h",
            Self::SevenDays => "7d",
            Self::FourteenDays => "14d",
            Self::ThirtyDays => "30d",
        }
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::TwentyFourHours
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1h" => Ok(Self::OneHour),
            "24h" => Ok(Self::TwentyFourHours),
            "7d" => Ok(Self::SevenDays),
            "14d" => Ok(Self::FourteenDays),
            "30d" => Ok(Self::ThirtyDays),
            other => Err(TypesError::UnknownWindow(other.to_string())),
        }
    }
}

/// Closed time range `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Build a range; a start after the end collapses to `[end, end]`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: start.min(end),
            end,
        }
    }

    /// Whether `instant` falls within the range (both ends inclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// Length of the range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_all_selectors() {
        for window in Window::ALL {
            let parsed: Window = window.as_str().parse().unwrap();
            assert_eq!(parsed, window);
        }
    }

    #[test]
    fn parse_rejects_unknown_selector() {
        let err = "2h".parse::<Window>().unwrap_err();
        assert_eq!(err, TypesError::UnknownWindow("2h".into()));
        assert!("".parse::<Window>().is_err());
        assert!("24H".parse::<Window>().is_err());
    }

    #[test]
    fn bucket_widths_follow_window_class() {
        assert_eq!(Window::OneHour.bucket_width(), Duration::minutes(5));
        assert_eq!(Window::TwentyFourHours.bucket_width(), Duration::hours(1));
        assert_eq!(Window::SevenDays.bucket_width(), Duration::days(1));
        assert_eq!(Window::FourteenDays.bucket_width(), Duration::days(1));
        assert_eq!(Window::ThirtyDays.bucket_width(), Duration::days(1));
    }

    #[test]
    fn range_ending_at_spans_window() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let range = Window::SevenDays.range_ending_at(now);
        assert_eq!(range.end, now);
        assert_eq!(range.duration(), Duration::days(7));
        assert!(range.contains(now));
        assert!(range.contains(range.start));
        assert!(!range.contains(now + Duration::seconds(1)));
    }

    #[test]
    fn inverted_range_collapses() {
        let end = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let range = TimeRange::new(end + Duration::hours(1), end);
        assert_eq!(range.start, end);
        assert_eq!(range.duration(), Duration::zero());
    }

    #[test]
    fn window_serializes_as_selector() {
        let json = serde_json::to_string(&Window::FourteenDays).unwrap();
        assert_eq!(json, "\"14d\"");
        let back: Window = serde_json::from_str("\"1h\"").unwrap();
        assert_eq!(back, Window::OneHour);
    }
}
