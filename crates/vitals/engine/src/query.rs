//! Telemetry query service: the façade callers use to obtain reports.
//!
//! Every call validates its input, fetches a bounded set of records, and
//! composes a fresh report. Nothing is cached between calls and store failures
//! are surfaced as-is, never retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use vitals_types::{EventRecord, TimeRange, Window};

use crate::config::EngineConfig;
use crate::error::{TelemetryError, TelemetryResult};
use crate::health::{evaluate_jobs, overall_health};
use crate::report::{
    compose_metrics_report, ApiErrorSummary, MetricsReport, OperationalReport, Rankings,
};
use crate::store::{EventFilter, EventStore, ExecutionQuery, JobExecutionStore};
use crate::surface::{JobSurface, RequestSurface, Surface};

/// Caller-facing query parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub window: Window,
    /// Case-insensitive substring of the primary identity (route, model, job).
    #[serde(default)]
    pub dimension_filter: Option<String>,
    #[serde(default)]
    pub min_duration_ms: Option<u64>,
    #[serde(default)]
    pub slow_only: bool,
    #[serde(default)]
    pub exclude_admin: bool,
    /// Overrides the configured top-N length.
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl MetricsQuery {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    /// Build a query from a window selector such as `"24h"`.
    pub fn parse(window: &str) -> TelemetryResult<Self> {
        let window = window.parse::<Window>().map_err(TelemetryError::InvalidWindow)?;
        Ok(Self::new(window))
    }

    /// Set the dimension filter; blank strings clear it.
    pub fn with_dimension(mut self, filter: Option<&str>) -> Self {
        self.dimension_filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_min_duration(mut self, min_duration_ms: Option<u64>) -> Self {
        self.min_duration_ms = min_duration_ms;
        self
    }

    pub fn with_slow_only(mut self, slow_only: bool) -> Self {
        self.slow_only = slow_only;
        self
    }

    pub fn with_exclude_admin(mut self, exclude_admin: bool) -> Self {
        self.exclude_admin = exclude_admin;
        self
    }

    pub fn with_top_n(mut self, top_n: Option<usize>) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn validate(&self) -> TelemetryResult<()> {
        if self.top_n == Some(0) {
            return Err(TelemetryError::InvalidQuery(
                "top-N length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// [`validate`](Self::validate), plus the checks that depend on the surface.
    pub fn validate_for<S: Surface + ?Sized>(&self, surface: &S) -> TelemetryResult<()> {
        self.validate()?;
        if self.slow_only && !surface.tracks_slow() {
            return Err(TelemetryError::InvalidQuery(format!(
                "slow-only is not supported on the {} surface",
                surface.name()
            )));
        }
        Ok(())
    }

    /// Store filter for events on `surface` matching this query.
    ///
    /// A surface with its own slow threshold applies it to `slow_only` too.
    pub fn event_filter<S: Surface + ?Sized>(
        &self,
        surface: &S,
        config: &EngineConfig,
    ) -> EventFilter {
        EventFilter {
            kind: Some(surface.kind()),
            dimension: self.dimension_filter.clone(),
            min_duration_ms: self.min_duration_ms,
            slow_only: self.slow_only,
            slow_threshold_ms: surface
                .slow_threshold_ms()
                .unwrap_or(config.slow_query_threshold_ms),
            exclude_admin: self.exclude_admin,
            limit: config.max_events,
        }
    }

    pub(crate) fn rankings(&self, config: &EngineConfig) -> Rankings {
        Rankings {
            top_n: self.top_n.unwrap_or(config.top_n),
            min_latency_samples: config.min_latency_samples,
        }
    }
}

/// Composes metrics and operational reports from pluggable stores.
pub struct TelemetryQueryService {
    events: Arc<dyn EventStore>,
    executions: Arc<dyn JobExecutionStore>,
    config: EngineConfig,
}

impl TelemetryQueryService {
    pub fn new(
        events: Arc<dyn EventStore>,
        executions: Arc<dyn JobExecutionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            events,
            executions,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metrics for `surface` over the query window ending now.
    pub async fn metrics_report<S: Surface + ?Sized>(
        &self,
        surface: &S,
        query: &MetricsQuery,
    ) -> TelemetryResult<MetricsReport> {
        self.metrics_report_at(surface, query, Utc::now()).await
    }

    #[instrument(skip(self, surface, query), fields(surface = surface.name(), window = %query.window))]
    pub async fn metrics_report_at<S: Surface + ?Sized>(
        &self,
        surface: &S,
        query: &MetricsQuery,
        now: DateTime<Utc>,
    ) -> TelemetryResult<MetricsReport> {
        query.validate_for(surface)?;
        let range = query.window.range_ending_at(now);
        let (events, truncated) = self.fetch_events(range, surface, query).await?;
        Ok(compose_metrics_report(
            surface,
            &events,
            query.window,
            now,
            query.rankings(&self.config),
            truncated,
        ))
    }

    /// Duration metrics for scheduled jobs, built from completed executions.
    pub async fn job_metrics_report(&self, query: &MetricsQuery) -> TelemetryResult<MetricsReport> {
        self.job_metrics_report_at(query, Utc::now()).await
    }

    #[instrument(skip(self, query), fields(window = %query.window))]
    pub async fn job_metrics_report_at(
        &self,
        query: &MetricsQuery,
        now: DateTime<Utc>,
    ) -> TelemetryResult<MetricsReport> {
        query.validate_for(&JobSurface)?;
        let range = query.window.range_ending_at(now);
        let mut executions = self
            .executions
            .find_executions(ExecutionQuery::Range(range))
            .await
            .map_err(|e| TelemetryError::store("executions", e))?;

        let cap = self.config.max_executions;
        let truncated = executions.len() > cap;
        if truncated {
            warn!(found = executions.len(), cap, "execution fetch capped, dropping oldest");
            executions.drain(..executions.len() - cap);
        }

        let filter = query.event_filter(&JobSurface, &self.config);
        let events: Vec<EventRecord> = executions
            .iter()
            .filter_map(|execution| execution.to_event())
            .filter(|event| range.contains(event.timestamp) && filter.matches(event))
            .collect();
        debug!(executions = executions.len(), events = events.len(), "job events derived");

        Ok(compose_metrics_report(
            &JobSurface,
            &events,
            query.window,
            now,
            query.rankings(&self.config),
            truncated,
        ))
    }

    /// Job health, API errors and overall health for `window` ending now.
    pub async fn operational_report(&self, window: Window) -> TelemetryResult<OperationalReport> {
        self.operational_report_at(window, Utc::now()).await
    }

    #[instrument(skip(self))]
    pub async fn operational_report_at(
        &self,
        window: Window,
        now: DateTime<Utc>,
    ) -> TelemetryResult<OperationalReport> {
        let cap = self.config.max_executions;
        let executions = self
            .executions
            .find_executions(ExecutionQuery::Recent(cap))
            .await
            .map_err(|e| TelemetryError::store("executions", e))?;
        let executions_capped = executions.len() >= cap;
        if executions_capped {
            warn!(cap, "execution fetch reached cap; oldest history not evaluated");
        }

        let query = MetricsQuery::new(window);
        let range = window.range_ending_at(now);
        let (events, events_capped) = self
            .fetch_events(range, &RequestSurface, &query)
            .await?;
        let requests = compose_metrics_report(
            &RequestSurface,
            &events,
            window,
            now,
            query.rankings(&self.config),
            events_capped,
        );
        let api_errors = ApiErrorSummary::from_report(&requests);

        let cron_jobs = evaluate_jobs(&executions, now, self.config.unhealthy_lookback());
        let overall = overall_health(
            cron_jobs.iter().map(|job| job.health),
            api_errors.totals.server_errors,
            self.config.degraded_server_error_threshold,
        );
        info!(
            health = %overall,
            jobs = cron_jobs.len(),
            server_errors = api_errors.totals.server_errors,
            "operational health evaluated"
        );

        Ok(OperationalReport {
            window,
            cron_jobs,
            api_errors,
            overall_health: overall,
            timestamp: now,
            truncated: executions_capped || events_capped,
        })
    }

    async fn fetch_events<S: Surface + ?Sized>(
        &self,
        range: TimeRange,
        surface: &S,
        query: &MetricsQuery,
    ) -> TelemetryResult<(Vec<EventRecord>, bool)> {
        let filter = query.event_filter(surface, &self.config);
        let events = self
            .events
            .find_events(range, &filter)
            .await
            .map_err(|e| TelemetryError::store("events", e))?;
        let truncated = events.len() >= filter.limit;
        if truncated {
            warn!(
                cap = filter.limit,
                start = %range.start,
                end = %range.end,
                "event fetch reached cap; report covers the most recent events only"
            );
        }
        debug!(count = events.len(), surface = surface.name(), "events fetched");
        Ok((events, truncated))
    }
}
