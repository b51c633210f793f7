//! Collaborator interfaces for event and job-execution storage.
//!
//! The engine never writes through these traits. Adapters share the
//! filtering and capping logic in [`select_events`] and
//! [`select_executions`] so every backend answers a query the same way.

use async_trait::async_trait;
use vitals_types::{
    EventKind, EventRecord, JobExecutionRecord, TimeRange, DEFAULT_SLOW_QUERY_THRESHOLD_MS,
};

use crate::config::DEFAULT_MAX_EVENTS;
use crate::error::StoreResult;

/// Predicate and cap applied to an event fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventFilter {
    pub kind: Option<EventKind>,
    /// Case-insensitive substring matched against the primary identity.
    pub dimension: Option<String>,
    pub min_duration_ms: Option<u64>,
    pub slow_only: bool,
    /// Request events without a write-time slow flag count as slow at or
    /// above this duration.
    pub slow_threshold_ms: u64,
    pub exclude_admin: bool,
    /// Most recent events to return.
    pub limit: usize,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            kind: None,
            dimension: None,
            min_duration_ms: None,
            slow_only: false,
            slow_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            exclude_admin: false,
            limit: DEFAULT_MAX_EVENTS,
        }
    }
}

impl EventFilter {
    pub fn for_kind(kind: EventKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `event` passes every predicate. The limit is not applied here.
    pub fn matches(&self, event: &EventRecord) -> bool {
        if self.kind.is_some_and(|kind| kind != event.kind()) {
            return false;
        }
        if self.exclude_admin && event.metadata.admin_route {
            return false;
        }
        if self.min_duration_ms.is_some_and(|min| event.duration_ms < min) {
            return false;
        }
        if self.slow_only && !self.is_slow(event) {
            return false;
        }
        match &self.dimension {
            Some(needle) => event
                .identity
                .primary()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }

    fn is_slow(&self, event: &EventRecord) -> bool {
        match event.outcome.status_code() {
            Some(_) => event.duration_ms >= self.slow_threshold_ms,
            None => event.outcome.is_slow(),
        }
    }
}

/// Which job executions to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionQuery {
    /// Executions started within the range.
    Range(TimeRange),
    /// The most recent executions by start time.
    Recent(usize),
}

/// Read access to recorded events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events in `range` matching `filter`, ascending by timestamp, keeping
    /// at most the `filter.limit` most recent.
    async fn find_events(&self, range: TimeRange, filter: &EventFilter)
        -> StoreResult<Vec<EventRecord>>;
}

/// Read access to job execution history.
#[async_trait]
pub trait JobExecutionStore: Send + Sync {
    /// Executions matching `query`, ascending by start time.
    async fn find_executions(&self, query: ExecutionQuery) -> StoreResult<Vec<JobExecutionRecord>>;
}

/// Apply `range` and `filter` to an event source.
pub fn select_events<'a, I>(events: I, range: TimeRange, filter: &EventFilter) -> Vec<EventRecord>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut selected: Vec<EventRecord> = events
        .into_iter()
        .filter(|e| range.contains(e.timestamp) && filter.matches(e))
        .cloned()
        .collect();
    selected.sort_by_key(|e| e.timestamp);
    keep_last(&mut selected, filter.limit);
    selected
}

/// Apply an [`ExecutionQuery`] to an execution source.
pub fn select_executions<'a, I>(executions: I, query: ExecutionQuery) -> Vec<JobExecutionRecord>
where
    I: IntoIterator<Item = &'a JobExecutionRecord>,
{
    let mut selected: Vec<JobExecutionRecord> = match query {
        ExecutionQuery::Range(range) => executions
            .into_iter()
            .filter(|e| range.contains(e.started_at))
            .cloned()
            .collect(),
        ExecutionQuery::Recent(_) => executions.into_iter().cloned().collect(),
    };
    selected.sort_by_key(|e| e.started_at);
    if let ExecutionQuery::Recent(limit) = query {
        keep_last(&mut selected, limit);
    }
    selected
}

fn keep_last<T>(items: &mut Vec<T>, limit: usize) {
    if items.len() > limit {
        items.drain(..items.len() - limit);
    }
}
