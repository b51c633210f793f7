//! Scheduled-job execution records, as reported by the external job runner.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TypesError;
use crate::record::EventRecord;

/// Execution-level state owned by the job runner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Running,
    Success,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "RUNNING"),
            Self::Success => write!(f, "SUCCESS"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RUNNING" => Ok(Self::Running),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            _ => Err(TypesError::UnknownJobStatus(s.to_string())),
        }
    }
}

/// One run of a scheduled job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub job_name: String,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobExecutionRecord {
    /// An execution that has started and not finished.
    pub fn running(job_name: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.into(),
            status: JobStatus::Running,
            started_at,
            completed_at: None,
            duration_ms: None,
            error: None,
        }
    }

    /// A successful execution that took `duration_ms`.
    pub fn succeeded(
        job_name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.into(),
            status: JobStatus::Success,
            started_at,
            completed_at: Some(started_at + chrono::Duration::milliseconds(duration_ms as i64)),
            duration_ms: Some(duration_ms),
            error: None,
        }
    }

    /// A failed execution.
    pub fn failed(
        job_name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            job_name: job_name.into(),
            status: JobStatus::Failed,
            started_at,
            completed_at: Some(started_at + chrono::Duration::milliseconds(duration_ms as i64)),
            duration_ms: Some(duration_ms),
            error: Some(error.into()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == JobStatus::Running
    }

    /// Convert a finished run into a job event for duration metrics.
    ///
    /// Returns `None` while the run is still in progress.
    pub fn to_event(&self) -> Option<EventRecord> {
        if self.is_running() {
            return None;
        }
        let duration_ms = self.duration_ms.unwrap_or_else(|| {
            self.completed_at
                .map(|done| (done - self.started_at).num_milliseconds().max(0) as u64)
                .unwrap_or(0)
        });
        let completed = self
            .completed_at
            .unwrap_or(self.started_at + chrono::Duration::milliseconds(duration_ms as i64));
        let mut event = EventRecord::job(
            completed,
            self.job_name.clone(),
            self.status == JobStatus::Success,
            duration_ms,
        );
        event.id = self.id;
        event.metadata.error_message = self.error.clone();
        Some(event)
    }
}
