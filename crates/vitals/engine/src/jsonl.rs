//! JSON-lines file store.
//!
//! Each non-blank line holds one serialized record. Files are re-read on every
//! query; a missing file reads as empty.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use vitals_types::{EventRecord, JobExecutionRecord, TimeRange};

use crate::error::{StoreError, StoreResult};
use crate::store::{
    select_events, select_executions, EventFilter, EventStore, ExecutionQuery, JobExecutionStore,
};

/// Reads events and executions from JSON-lines files.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesStore {
    events_path: Option<PathBuf>,
    executions_path: Option<PathBuf>,
}

impl JsonLinesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, path: impl Into<PathBuf>) -> Self {
        self.events_path = Some(path.into());
        self
    }

    pub fn with_executions(mut self, path: impl Into<PathBuf>) -> Self {
        self.executions_path = Some(path.into());
        self
    }

    pub fn events_path(&self) -> Option<&Path> {
        self.events_path.as_deref()
    }

    pub fn executions_path(&self) -> Option<&Path> {
        self.executions_path.as_deref()
    }
}

/// Read and decode every record in `path`.
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "records file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    parse_records(&contents)
}

/// Decode JSON-lines text, naming the first bad line (1-based).
pub fn parse_records<T: DeserializeOwned>(contents: &str) -> StoreResult<Vec<T>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| StoreError::Decode {
                line: index + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl EventStore for JsonLinesStore {
    async fn find_events(
        &self,
        range: TimeRange,
        filter: &EventFilter,
    ) -> StoreResult<Vec<EventRecord>> {
        let Some(path) = self.events_path.as_deref() else {
            return Ok(Vec::new());
        };
        let events: Vec<EventRecord> = read_records(path).await?;
        Ok(select_events(&events, range, filter))
    }
}

#[async_trait]
impl JobExecutionStore for JsonLinesStore {
    async fn find_executions(&self, query: ExecutionQuery) -> StoreResult<Vec<JobExecutionRecord>> {
        let Some(path) = self.executions_path.as_deref() else {
            return Ok(Vec::new());
        };
        let executions: Vec<JobExecutionRecord> = read_records(path).await?;
        Ok(select_executions(&executions, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn at(m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 9, 9, m, 0).unwrap()
    }

    fn write_lines(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_reads_events_and_skips_blank_lines() {
        let events = [
            EventRecord::request(at(1), "/api/games", "GET", 200, 40),
            EventRecord::request(at(2), "/api/games", "GET", 500, 90),
        ];
        let mut lines: Vec<String> = events
            .iter()
            .map(|e| serde_json::to_string(e).unwrap())
            .collect();
        lines.insert(1, String::new());
        let file = write_lines(&lines);

        let store = JsonLinesStore::new().with_events(file.path());
        let range = TimeRange::new(at(0), at(0) + Duration::hours(1));
        let found = store
            .find_events(range, &EventFilter::default())
            .await
            .unwrap();
        assert_eq!(found, events.to_vec());
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonLinesStore::new()
            .with_events(dir.path().join("absent.jsonl"))
            .with_executions(dir.path().join("absent-runs.jsonl"));
        let range = TimeRange::new(at(0), at(30));
        assert!(store
            .find_events(range, &EventFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .find_executions(ExecutionQuery::Recent(10))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_bad_line_is_decode_error() {
        let good = serde_json::to_string(&JobExecutionRecord::succeeded("a", at(1), 5)).unwrap();
        let file = write_lines(&[good, "{not json".to_string()]);
        let store = JsonLinesStore::new().with_executions(file.path());
        let err = store
            .find_executions(ExecutionQuery::Recent(10))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Decode { line: 2, .. }));
    }

    #[test]
    fn test_hand_written_record_decodes() {
        let line = r#"{"timestamp":"2026-09-09T09:01:00Z","identity":{"kind":"dataAccess","model":"Game","action":"findMany"},"durationMs":1200,"outcome":{"type":"completion","success":true,"slow":true}}"#;
        let records: Vec<EventRecord> = parse_records(line).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].outcome.is_slow());
        assert_eq!(records[0].identity.to_string(), "Game.findMany");
    }
}
