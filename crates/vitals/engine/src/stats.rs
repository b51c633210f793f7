//! Duration statistics.
//!
//! Percentiles use the nearest-rank method: the sample at index
//! `ceil(p / 100 * n) - 1` of the ascending list. No interpolation, so every
//! reported figure is a duration that was actually observed and the result is
//! reproducible bit for bit.

use serde::{Deserialize, Serialize};

/// Nearest-rank percentile of `samples`; 0 for an empty slice.
///
/// `p` is clamped to `[0, 100]`.
pub fn percentile(samples: &[u64], p: f64) -> u64 {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    percentile_sorted(&sorted, p)
}

/// Nearest-rank percentile of an already ascending slice.
pub fn percentile_sorted(sorted: &[u64], p: f64) -> u64 {
    let n = sorted.len();
    if n == 0 {
        return 0;
    }
    let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 100.0) };
    // p * n before dividing keeps integral ranks exact.
    let rank = (p * n as f64 / 100.0).ceil() as usize;
    let index = rank.saturating_sub(1).min(n - 1);
    sorted[index]
}

/// Arithmetic mean rounded to the nearest millisecond (halves round up); 0 when empty.
pub fn average(samples: &[u64]) -> u64 {
    if samples.is_empty() {
        return 0;
    }
    let n = samples.len() as u128;
    let sum: u128 = samples.iter().map(|&s| s as u128).sum();
    ((2 * sum + n) / (2 * n)) as u64
}

/// `part / whole` as a percentage with two decimals; 0 when `whole` is 0.
pub fn rate_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 10_000.0 / whole as f64).round() / 100.0
}

/// Percentile and average figures for one set of durations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub avg: u64,
}

impl LatencySummary {
    /// Sort once and derive every figure.
    pub fn from_samples(mut samples: Vec<u64>) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        samples.sort_unstable();
        let n = samples.len();
        Self {
            count: n,
            min: samples[0],
            max: samples[n - 1],
            p50: percentile_sorted(&samples, 50.0),
            p95: percentile_sorted(&samples, 95.0),
            p99: percentile_sorted(&samples, 99.0),
            avg: average(&samples),
        }
    }
}
