//! Event records: the atomic unit of telemetry.
//!
//! An [`EventRecord`] describes one completed operation. Records are
//! append-only; the engine only ever reads them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Data-access calls at or above this duration are flagged slow at write time.
pub const DEFAULT_SLOW_QUERY_THRESHOLD_MS: u64 = 1_000;

/// Who or what performed the operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EventIdentity {
    /// An HTTP request against a route.
    Request { route: String, method: String },
    /// A data-layer call against a model.
    DataAccess { model: String, action: String },
    /// A completed scheduled-job run.
    Job { name: String },
}

impl EventIdentity {
    /// Coarse kind of this identity.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Request { .. } => EventKind::Request,
            Self::DataAccess { .. } => EventKind::DataAccess,
            Self::Job { .. } => EventKind::Job,
        }
    }

    /// The primary identity axis: route, model, or job name.
    pub fn primary(&self) -> &str {
        match self {
            Self::Request { route, .. } => route,
            Self::DataAccess { model, .. } => model,
            Self::Job { name } => name,
        }
    }
}

impl fmt::Display for EventIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { route, method } => write!(f, "{} {}", method, route),
            Self::DataAccess { model, action } => write!(f, "{}.{}", model, action),
            Self::Job { name } => write!(f, "job:{}", name),
        }
    }
}

/// Coarse event kind, used by store filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Request,
    DataAccess,
    Job,
}

/// How the operation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventOutcome {
    /// HTTP status code. Success iff `< 400`.
    Status { code: u16 },
    /// Explicit success flag plus the write-time slow flag.
    Completion {
        success: bool,
        #[serde(default)]
        slow: bool,
    },
}

impl EventOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Status { code } => *code < 400,
            Self::Completion { success, .. } => *success,
        }
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Status `>= 500`. Completion outcomes never count as server errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Status { code } if *code >= 500)
    }

    pub fn is_slow(&self) -> bool {
        matches!(self, Self::Completion { slow: true, .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code } => Some(*code),
            Self::Completion { .. } => None,
        }
    }
}

/// Optional context carried alongside an event.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_rows: Option<u64>,
    /// Request hit an administrative route.
    #[serde(default)]
    pub admin_route: bool,
}

/// One observed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// When the operation completed.
    pub timestamp: DateTime<Utc>,
    pub identity: EventIdentity,
    pub duration_ms: u64,
    pub outcome: EventOutcome,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl EventRecord {
    /// A request event.
    pub fn request(
        timestamp: DateTime<Utc>,
        route: impl Into<String>,
        method: impl Into<String>,
        status: u16,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            identity: EventIdentity::Request {
                route: route.into(),
                method: method.into().to_uppercase(),
            },
            duration_ms,
            outcome: EventOutcome::Status { code: status },
            metadata: EventMetadata::default(),
        }
    }

    /// A data-access event. `slow` is fixed here from `slow_threshold_ms`.
    pub fn data_access(
        timestamp: DateTime<Utc>,
        model: impl Into<String>,
        action: impl Into<String>,
        success: bool,
        duration_ms: u64,
        slow_threshold_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            identity: EventIdentity::DataAccess {
                model: model.into(),
                action: action.into(),
            },
            duration_ms,
            outcome: EventOutcome::Completion {
                success,
                slow: duration_ms >= slow_threshold_ms,
            },
            metadata: EventMetadata::default(),
        }
    }

    /// A completed job-run event.
    pub fn job(
        timestamp: DateTime<Utc>,
        name: impl Into<String>,
        success: bool,
        duration_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            identity: EventIdentity::Job { name: name.into() },
            duration_ms,
            outcome: EventOutcome::Completion {
                success,
                slow: false,
            },
            metadata: EventMetadata::default(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn kind(&self) -> EventKind {
        self.identity.kind()
    }
}
