//! Metrics surface commands: requests, perf, queries, jobs

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::*;
use vitals_engine::{
    DataAccessSurface, MetricsReport, PerfSurface, RequestSurface, TelemetryQueryService,
};

use crate::commands::QueryArgs;
use crate::error::CliResult;
use crate::output::{print_structured, print_table, print_warning, BucketRow, GroupRow, OutputFormat};

/// How the `queries` surface groups data-access calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// One row per model
    #[default]
    Model,
    /// One row per operation
    Operation,
}

/// Which metrics surface to report on.
#[derive(Debug, Clone, Copy)]
pub enum MetricsSurface {
    Requests,
    Perf { slow_threshold_ms: Option<u64> },
    Queries { group_by: GroupBy },
    Jobs,
}

/// Execute a metrics command
pub async fn execute(
    surface: MetricsSurface,
    args: &QueryArgs,
    service: &TelemetryQueryService,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> CliResult<()> {
    let query = args.to_query()?;
    let report = match surface {
        MetricsSurface::Requests => service.metrics_report_at(&RequestSurface, &query, now).await?,
        MetricsSurface::Perf { slow_threshold_ms } => {
            let threshold = slow_threshold_ms.unwrap_or(service.config().slow_query_threshold_ms);
            service
                .metrics_report_at(&PerfSurface::new(threshold), &query, now)
                .await?
        }
        MetricsSurface::Queries { group_by } => {
            let surface = match group_by {
                GroupBy::Model => DataAccessSurface::by_model(),
                GroupBy::Operation => DataAccessSurface::by_operation(),
            };
            service.metrics_report_at(&surface, &query, now).await?
        }
        MetricsSurface::Jobs => service.job_metrics_report_at(&query, now).await?,
    };

    match format {
        OutputFormat::Table => {
            print_report(&report);
            Ok(())
        }
        _ => print_structured(&report, format),
    }
}

fn print_report(report: &MetricsReport) {
    if report.truncated {
        print_warning("event cap reached; only the most recent events were aggregated");
    }

    let totals = &report.totals.stats;
    println!(
        "{} {} over {} (as of {})",
        "Surface:".bold(),
        report.surface,
        report.window,
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "  {} total, {} errors ({}%), {} server errors, {} slow, {:.2}/min",
        totals.requests,
        totals.errors,
        totals.error_rate,
        totals.server_errors,
        totals.slow,
        report.totals.requests_per_minute
    );
    println!(
        "  latency p50 {}ms  p95 {}ms  p99 {}ms  avg {}ms  across {} dimensions",
        totals.p50, totals.p95, totals.p99, totals.avg_duration, report.totals.dimensions
    );
    println!();

    print_table(
        "Time series",
        report.time_series.iter().map(BucketRow::from).collect(),
    );
    print_table(
        "Top by volume",
        report.top_by_volume.iter().map(GroupRow::from).collect(),
    );
    print_table(
        "Slowest (p95)",
        report.top_by_latency.iter().map(GroupRow::from).collect(),
    );
}
