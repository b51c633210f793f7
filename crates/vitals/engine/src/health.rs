//! Job health state machine and system health aggregation.
//!
//! Labels are derived from execution history on every call and never cached.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vitals_types::{JobExecutionRecord, JobHealth, JobStatus, SystemHealth};

use crate::stats::{average, rate_percent};

/// Condensed view of one execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    pub id: Uuid,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&JobExecutionRecord> for ExecutionSummary {
    fn from(record: &JobExecutionRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            started_at: record.started_at,
            completed_at: record.completed_at,
            duration_ms: record.duration_ms,
            error: record.error.clone(),
        }
    }
}

/// Execution counts by status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionCounts {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub running: u64,
}

impl ExecutionCounts {
    fn add(&mut self, status: JobStatus) {
        self.total += 1;
        match status {
            JobStatus::Success => self.successful += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Running => self.running += 1,
        }
    }
}

/// Per-job statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    #[serde(flatten)]
    pub all: ExecutionCounts,
    /// Counts for executions started within the look-back.
    pub recent: ExecutionCounts,
    /// Successful runs as a percentage of finished runs, two decimals.
    pub success_rate: f64,
    /// Mean duration of successful runs that recorded one.
    pub avg_duration_ms: Option<u64>,
}

/// Health and history for one scheduled job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHealthReport {
    pub job_name: String,
    pub last_execution: Option<ExecutionSummary>,
    pub last_success: Option<ExecutionSummary>,
    pub last_failure: Option<ExecutionSummary>,
    pub stats: JobStats,
    pub health: JobHealth,
}

/// Evaluate one job's executions at `now`.
///
/// `running` wins over everything. Otherwise the job is `unhealthy` when its
/// latest execution failed, that failure is newer than the last success, and
/// nothing started within `lookback` succeeded.
pub fn evaluate_job<'a, I>(
    job_name: &str,
    executions: I,
    now: DateTime<Utc>,
    lookback: Duration,
) -> JobHealthReport
where
    I: IntoIterator<Item = &'a JobExecutionRecord>,
{
    let since = now - lookback;
    let mut all = ExecutionCounts::default();
    let mut recent = ExecutionCounts::default();
    let mut last: Option<&JobExecutionRecord> = None;
    let mut last_success: Option<&JobExecutionRecord> = None;
    let mut last_failure: Option<&JobExecutionRecord> = None;
    let mut recent_success = false;
    let mut success_durations = Vec::new();

    for execution in executions {
        all.add(execution.status);
        let is_recent = execution.started_at >= since && execution.started_at <= now;
        if is_recent {
            recent.add(execution.status);
        }
        last = latest(last, execution);
        match execution.status {
            JobStatus::Success => {
                last_success = latest(last_success, execution);
                recent_success |= is_recent;
                if let Some(ms) = execution.duration_ms {
                    success_durations.push(ms);
                }
            }
            JobStatus::Failed => last_failure = latest(last_failure, execution),
            JobStatus::Running => {}
        }
    }

    let failure_is_newest = match (last_failure, last_success) {
        (Some(_), None) => true,
        (Some(failure), Some(success)) => failure.started_at > success.started_at,
        (None, _) => false,
    };
    let health = if all.running > 0 {
        JobHealth::Running
    } else if last.is_some_and(|e| e.status == JobStatus::Failed)
        && failure_is_newest
        && !recent_success
    {
        JobHealth::Unhealthy
    } else {
        JobHealth::Healthy
    };

    let finished = all.successful + all.failed;
    JobHealthReport {
        job_name: job_name.to_string(),
        last_execution: last.map(ExecutionSummary::from),
        last_success: last_success.map(ExecutionSummary::from),
        last_failure: last_failure.map(ExecutionSummary::from),
        stats: JobStats {
            all,
            recent,
            success_rate: rate_percent(all.successful, finished),
            avg_duration_ms: (!success_durations.is_empty()).then(|| average(&success_durations)),
        },
        health,
    }
}

fn latest<'a>(
    current: Option<&'a JobExecutionRecord>,
    candidate: &'a JobExecutionRecord,
) -> Option<&'a JobExecutionRecord> {
    match current {
        Some(existing) if existing.started_at > candidate.started_at => Some(existing),
        _ => Some(candidate),
    }
}

/// Group executions by job name and evaluate each; sorted by name.
pub fn evaluate_jobs(
    executions: &[JobExecutionRecord],
    now: DateTime<Utc>,
    lookback: Duration,
) -> Vec<JobHealthReport> {
    let mut by_job: BTreeMap<&str, Vec<&JobExecutionRecord>> = BTreeMap::new();
    for execution in executions {
        by_job
            .entry(execution.job_name.as_str())
            .or_default()
            .push(execution);
    }
    by_job
        .into_iter()
        .map(|(name, runs)| evaluate_job(name, runs, now, lookback))
        .collect()
}

/// Overall status, in strict priority order: any unhealthy job, any running
/// job, more than `degraded_threshold` server errors, otherwise healthy.
pub fn overall_health<I>(jobs: I, server_errors: u64, degraded_threshold: u64) -> SystemHealth
where
    I: IntoIterator<Item = JobHealth>,
{
    let mut any_running = false;
    for health in jobs {
        match health {
            JobHealth::Unhealthy => return SystemHealth::Unhealthy,
            JobHealth::Running => any_running = true,
            JobHealth::Healthy => {}
        }
    }
    if any_running {
        SystemHealth::Running
    } else if server_errors > degraded_threshold {
        SystemHealth::Degraded
    } else {
        SystemHealth::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap()
    }

    fn hours_ago(h: i64) -> DateTime<Utc> {
        now() - Duration::hours(h)
    }

    fn day() -> Duration {
        Duration::hours(24)
    }

    #[test]
    fn latest_failure_without_recent_success_is_unhealthy() {
        let runs = vec![
            JobExecutionRecord::succeeded("digest", hours_ago(50), 1_000),
            JobExecutionRecord::failed("digest", hours_ago(26), 500, "smtp timeout"),
            JobExecutionRecord::failed("digest", hours_ago(2), 500, "smtp timeout"),
        ];
        let report = evaluate_job("digest", &runs, now(), day());
        assert_eq!(report.health, JobHealth::Unhealthy);
        assert_eq!(report.stats.all.failed, 2);
        assert_eq!(report.stats.recent.total, 1);
        assert_eq!(report.last_failure.unwrap().started_at, hours_ago(2));
    }

    #[test]
    fn recent_success_keeps_job_healthy() {
        let runs = vec![
            JobExecutionRecord::succeeded("digest", hours_ago(3), 1_000),
            JobExecutionRecord::failed("digest", hours_ago(1), 500, "boom"),
        ];
        let report = evaluate_job("digest", &runs, now(), day());
        assert_eq!(report.health, JobHealth::Healthy);
    }

    #[test]
    fn running_wins_over_failure() {
        let runs = vec![
            JobExecutionRecord::failed("sync", hours_ago(30), 500, "boom"),
            JobExecutionRecord::running("sync", hours_ago(0)),
        ];
        let report = evaluate_job("sync", &runs, now(), day());
        assert_eq!(report.health, JobHealth::Running);
    }

    #[test]
    fn recovery_resets_unhealthy() {
        let mut runs = vec![JobExecutionRecord::failed("sync", hours_ago(40), 10, "boom")];
        assert_eq!(
            evaluate_job("sync", &runs, now(), day()).health,
            JobHealth::Unhealthy
        );
        runs.push(JobExecutionRecord::succeeded("sync", hours_ago(1), 10));
        assert_eq!(
            evaluate_job("sync", &runs, now(), day()).health,
            JobHealth::Healthy
        );
    }

    #[test]
    fn no_history_is_healthy() {
        let none: Vec<JobExecutionRecord> = Vec::new();
        let report = evaluate_job("idle", &none, now(), day());
        assert_eq!(report.health, JobHealth::Healthy);
        assert!(report.last_execution.is_none());
        assert_eq!(report.stats.avg_duration_ms, None);
    }

    #[test]
    fn average_counts_only_successful_runs() {
        let runs = vec![
            JobExecutionRecord::succeeded("report", hours_ago(5), 100),
            JobExecutionRecord::succeeded("report", hours_ago(4), 201),
            JobExecutionRecord::failed("report", hours_ago(3), 9_999, "boom"),
        ];
        let report = evaluate_job("report", &runs, now(), day());
        assert_eq!(report.stats.avg_duration_ms, Some(151));
        assert_eq!(report.stats.success_rate, 66.67);
    }

    #[test]
    fn jobs_are_sorted_by_name() {
        let runs = vec![
            JobExecutionRecord::succeeded("zeta", hours_ago(1), 1),
            JobExecutionRecord::succeeded("alpha", hours_ago(1), 1),
            JobExecutionRecord::succeeded("mid", hours_ago(1), 1),
        ];
        let names: Vec<_> = evaluate_jobs(&runs, now(), day())
            .into_iter()
            .map(|r| r.job_name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn system_health_priority() {
        use JobHealth::*;
        assert_eq!(overall_health([Healthy, Unhealthy, Running], 50, 10), SystemHealth::Unhealthy);
        assert_eq!(overall_health([Healthy, Running], 50, 10), SystemHealth::Running);
        assert_eq!(overall_health([Healthy], 11, 10), SystemHealth::Degraded);
        assert_eq!(overall_health([Healthy], 10, 10), SystemHealth::Healthy);
        assert_eq!(overall_health(Vec::new(), 0, 10), SystemHealth::Healthy);
    }

    #[test]
    fn report_serializes_camel_case() {
        let runs = vec![JobExecutionRecord::succeeded("purge", hours_ago(1), 42)];
        let report = evaluate_job("purge", &runs, now(), day());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["jobName"], "purge");
        assert_eq!(json["health"], "healthy");
        assert_eq!(json["stats"]["successful"], 1);
        assert_eq!(json["stats"]["avgDurationMs"], 42);
        assert_eq!(json["lastExecution"]["status"], "SUCCESS");
    }
}
