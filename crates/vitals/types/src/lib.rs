//! # vitals-types
//!
//! Shared data model for the Vitals telemetry engine.
//!
//! - [`EventRecord`]: one observed request, data-access call, or job run
//! - [`JobExecutionRecord`]: one scheduled-job execution as reported by the runner
//! - [`Window`]: the caller-selected look-back for a query
//! - [`JobHealth`] / [`SystemHealth`]: derived health labels
//!
//! Everything here is plain data. Aggregation lives in `vitals-engine`.

#![deny(unsafe_code)]

pub mod error;
pub mod health;
pub mod job;
pub mod record;
pub mod window;

pub use error::{TypesError, TypesResult};
pub use health::{JobHealth, SystemHealth};
pub use job::{JobExecutionRecord, JobStatus};
pub use record::{
    EventIdentity, EventKind, EventMetadata, EventOutcome, EventRecord,
    DEFAULT_SLOW_QUERY_THRESHOLD_MS,
};
pub use window::{TimeRange, Window};
