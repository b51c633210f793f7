//! Engine configuration.
//!
//! All thresholds that shape aggregation and health derivation live here so
//! they can be tuned without touching the algorithms.

use serde::{Deserialize, Serialize};
use vitals_types::DEFAULT_SLOW_QUERY_THRESHOLD_MS;

/// Most recent events fetched per query.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

/// Most recent job executions fetched for the operational view.
pub const DEFAULT_MAX_EXECUTIONS: usize = 1_000;

/// Length of the top-N lists.
pub const DEFAULT_TOP_N: usize = 10;

/// Groups with fewer samples never appear in the slowest list.
pub const DEFAULT_MIN_LATENCY_SAMPLES: usize = 5;

/// More than this many 5xx responses in the window marks the system degraded.
pub const DEFAULT_DEGRADED_SERVER_ERROR_THRESHOLD: u64 = 10;

/// A failing job is unhealthy only if nothing succeeded within this look-back.
pub const DEFAULT_UNHEALTHY_LOOKBACK_HOURS: i64 = 24;

/// Ring-buffer capacity of the in-memory collector.
pub const DEFAULT_COLLECTOR_CAPACITY: usize = 1_000;

/// Configuration for the telemetry engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard cap on events read per query.
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Hard cap on job executions read for the operational view.
    #[serde(default = "default_max_executions")]
    pub max_executions: usize,

    /// Default length of top-by-volume / top-by-latency lists.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Minimum samples for a group to be ranked by latency.
    #[serde(default = "default_min_latency_samples")]
    pub min_latency_samples: usize,

    /// 5xx count above which overall health is `degraded`.
    #[serde(default = "default_degraded_threshold")]
    pub degraded_server_error_threshold: u64,

    /// Look-back for the job "recent success" rule, in hours.
    #[serde(default = "default_unhealthy_lookback_hours")]
    pub unhealthy_lookback_hours: i64,

    /// Data-access calls at or above this duration are flagged slow.
    #[serde(default = "default_slow_query_threshold_ms")]
    pub slow_query_threshold_ms: u64,

    /// Capacity of the in-memory collector's ring buffer.
    #[serde(default = "default_collector_capacity")]
    pub collector_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            max_executions: DEFAULT_MAX_EXECUTIONS,
            top_n: DEFAULT_TOP_N,
            min_latency_samples: DEFAULT_MIN_LATENCY_SAMPLES,
            degraded_server_error_threshold: DEFAULT_DEGRADED_SERVER_ERROR_THRESHOLD,
            unhealthy_lookback_hours: DEFAULT_UNHEALTHY_LOOKBACK_HOURS,
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            collector_capacity: DEFAULT_COLLECTOR_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Job-health look-back as a duration.
    pub fn unhealthy_lookback(&self) -> chrono::Duration {
        chrono::Duration::hours(self.unhealthy_lookback_hours.max(0))
    }
}

// Default value helpers
fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

fn default_max_executions() -> usize {
    DEFAULT_MAX_EXECUTIONS
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_min_latency_samples() -> usize {
    DEFAULT_MIN_LATENCY_SAMPLES
}

fn default_degraded_threshold() -> u64 {
    DEFAULT_DEGRADED_SERVER_ERROR_THRESHOLD
}

fn default_unhealthy_lookback_hours() -> i64 {
    DEFAULT_UNHEALTHY_LOOKBACK_HOURS
}

fn default_slow_query_threshold_ms() -> u64 {
    DEFAULT_SLOW_QUERY_THRESHOLD_MS
}

fn default_collector_capacity() -> usize {
    DEFAULT_COLLECTOR_CAPACITY
}
