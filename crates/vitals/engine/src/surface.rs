//! Reporting surfaces.
//!
//! A surface decides which events it reports on, how each event is keyed into
//! a dimension group, and how its outcome is classified. Requests, endpoint
//! performance, data access and scheduled jobs are all the same aggregation
//! run with a different surface.

use std::fmt;

use vitals_types::{EventIdentity, EventKind, EventRecord};

/// Dimension-group key plus the sub-dimension observed on this event.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub key: String,
    pub sub: Option<String>,
}

impl GroupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sub: None,
        }
    }

    pub fn with_sub(key: impl Into<String>, sub: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            sub: Some(sub.into()),
        }
    }
}

/// Outcome flags counted by the aggregator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeClass {
    pub error: bool,
    pub server_error: bool,
    pub slow: bool,
}

/// Identity extraction and outcome classification for one reporting view.
pub trait Surface: Send + Sync {
    /// Stable name used in reports and logs.
    fn name(&self) -> &'static str;

    /// Event kind this surface reads from the store.
    fn kind(&self) -> EventKind;

    /// Whether the event belongs to this surface.
    fn accepts(&self, event: &EventRecord) -> bool {
        event.kind() == self.kind()
    }

    /// Dimension group for an accepted event.
    fn group_key(&self, event: &EventRecord) -> GroupKey;

    /// Latency threshold this surface classifies slow requests by, if it
    /// overrides the configured one.
    fn slow_threshold_ms(&self) -> Option<u64> {
        None
    }

    /// Whether events on this surface can be slow at all.
    fn tracks_slow(&self) -> bool {
        true
    }

    /// Outcome flags for an accepted event.
    fn classify(&self, event: &EventRecord) -> OutcomeClass {
        OutcomeClass {
            error: event.outcome.is_error(),
            server_error: event.outcome.is_server_error(),
            slow: event.outcome.is_slow(),
        }
    }
}

/// HTTP requests grouped by route; methods are the sub-dimension.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSurface;

impl Surface for RequestSurface {
    fn name(&self) -> &'static str {
        "requests"
    }

    fn kind(&self) -> EventKind {
        EventKind::Request
    }

    fn group_key(&self, event: &EventRecord) -> GroupKey {
        match &event.identity {
            EventIdentity::Request { route, method } => GroupKey::with_sub(route, method),
            other => GroupKey::new(other.primary()),
        }
    }
}

/// HTTP requests grouped by endpoint (`METHOD route`), flagging requests at or
/// above a latency threshold as slow.
#[derive(Clone, Copy, Debug)]
pub struct PerfSurface {
    pub slow_threshold_ms: u64,
}

impl PerfSurface {
    pub fn new(slow_threshold_ms: u64) -> Self {
        Self { slow_threshold_ms }
    }
}

impl Surface for PerfSurface {
    fn name(&self) -> &'static str {
        "perf"
    }

    fn kind(&self) -> EventKind {
        EventKind::Request
    }

    fn group_key(&self, event: &EventRecord) -> GroupKey {
        GroupKey::new(event.identity.to_string())
    }

    fn slow_threshold_ms(&self) -> Option<u64> {
        Some(self.slow_threshold_ms)
    }

    fn classify(&self, event: &EventRecord) -> OutcomeClass {
        OutcomeClass {
            error: event.outcome.is_error(),
            server_error: event.outcome.is_server_error(),
            slow: event.duration_ms >= self.slow_threshold_ms,
        }
    }
}

/// How data-access events are grouped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DataAccessGrouping {
    /// Group by model; actions are the sub-dimension.
    #[default]
    Model,
    /// Group by action; models are the sub-dimension.
    Operation,
}

impl fmt::Display for DataAccessGrouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => write!(f, "model"),
            Self::Operation => write!(f, "operation"),
        }
    }
}

/// Data-layer calls.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataAccessSurface {
    pub grouping: DataAccessGrouping,
}

impl DataAccessSurface {
    pub fn by_model() -> Self {
        Self {
            grouping: DataAccessGrouping::Model,
        }
    }

    pub fn by_operation() -> Self {
        Self {
            grouping: DataAccessGrouping::Operation,
        }
    }
}

impl Surface for DataAccessSurface {
    fn name(&self) -> &'static str {
        "queries"
    }

    fn kind(&self) -> EventKind {
        EventKind::DataAccess
    }

    fn group_key(&self, event: &EventRecord) -> GroupKey {
        match (&event.identity, self.grouping) {
            (EventIdentity::DataAccess { model, action }, DataAccessGrouping::Model) => {
                GroupKey::with_sub(model, action)
            }
            (EventIdentity::DataAccess { model, action }, DataAccessGrouping::Operation) => {
                GroupKey::with_sub(action, model)
            }
            (other, _) => GroupKey::new(other.primary()),
        }
    }
}

/// Completed scheduled-job runs grouped by job name.
#[derive(Clone, Copy, Debug, Default)]
pub struct JobSurface;

impl Surface for JobSurface {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn kind(&self) -> EventKind {
        EventKind::Job
    }

    fn group_key(&self, event: &EventRecord) -> GroupKey {
        GroupKey::new(event.identity.primary())
    }

    // Job runs carry no slow flag.
    fn tracks_slow(&self) -> bool {
        false
    }
}
