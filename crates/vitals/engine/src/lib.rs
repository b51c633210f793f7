//! # vitals-engine
//!
//! Telemetry aggregation and operational health for the Vitals platform.
//!
//! ## Overview
//!
//! The engine turns raw timing events into reports:
//!
//! - **Statistics**: nearest-rank percentiles and rounded averages ([`stats`])
//! - **Time buckets**: epoch-aligned bucket plans per window ([`bucket`])
//! - **Aggregation**: one linear pass over events filling buckets, dimension
//!   groups and totals ([`aggregate`]), parameterized by a [`Surface`]
//! - **Health**: per-job health state and the overall system verdict ([`health`])
//!
//! Storage is pluggable through [`EventStore`] and [`JobExecutionStore`].
//! [`InMemoryStore`] and [`JsonLinesStore`] are the reference adapters, and the
//! bounded [`MetricsCollector`] records events in-process and serves them back.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitals_engine::{
//!     EngineConfig, InMemoryStore, MetricsQuery, RequestSurface, TelemetryQueryService,
//! };
//!
//! # async fn example() -> vitals_engine::TelemetryResult<()> {
//! let store = Arc::new(InMemoryStore::new());
//! let service = TelemetryQueryService::new(store.clone(), store, EngineConfig::default());
//!
//! let query = MetricsQuery::parse("24h")?.with_dimension(Some("/api/games"));
//! let report = service.metrics_report(&RequestSurface, &query).await?;
//! println!("{} requests, p95 {}ms", report.totals.stats.requests, report.totals.stats.p95);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod aggregate;
pub mod bucket;
pub mod collector;
pub mod config;
pub mod error;
pub mod health;
pub mod jsonl;
pub mod memory;
pub mod query;
pub mod report;
pub mod stats;
pub mod store;
pub mod surface;

pub use aggregate::{Aggregation, Aggregator, BucketStats, GroupStats, OutcomeStats};
pub use bucket::{bucket_key, BucketPlan};
pub use collector::{CollectorStats, MetricsCollector, RingBuffer};
pub use config::EngineConfig;
pub use error::{StoreError, StoreResult, TelemetryError, TelemetryResult};
pub use health::{
    evaluate_job, evaluate_jobs, overall_health, ExecutionCounts, ExecutionSummary,
    JobHealthReport, JobStats,
};
pub use jsonl::JsonLinesStore;
pub use memory::InMemoryStore;
pub use query::{MetricsQuery, TelemetryQueryService};
pub use report::{
    compose_metrics_report, ApiErrorPoint, ApiErrorSummary, ApiErrorTotals, MetricsReport,
    OperationalReport, Rankings, Totals,
};
pub use stats::{average, percentile, rate_percent, LatencySummary};
pub use store::{EventFilter, EventStore, ExecutionQuery, JobExecutionStore};
pub use surface::{
    DataAccessGrouping, DataAccessSurface, GroupKey, JobSurface, OutcomeClass, PerfSurface,
    RequestSurface, Surface,
};

pub use vitals_types as types;
