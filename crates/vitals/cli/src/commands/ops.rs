//! Operational health command

use chrono::{DateTime, Utc};
use colored::*;
use vitals_engine::{MetricsQuery, OperationalReport, TelemetryQueryService};

use crate::error::CliResult;
use crate::output::{colorize_system, print_structured, print_table, print_warning, JobRow, OutputFormat};

/// Execute the `ops` command
pub async fn execute(
    window: &str,
    service: &TelemetryQueryService,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> CliResult<()> {
    let window = MetricsQuery::parse(window)?.window;
    let report = service.operational_report_at(window, now).await?;

    match format {
        OutputFormat::Table => {
            print_report(&report);
            Ok(())
        }
        _ => print_structured(&report, format),
    }
}

fn print_report(report: &OperationalReport) {
    if report.truncated {
        print_warning("fetch cap reached; the verdict covers the most recent records only");
    }

    println!(
        "{} {} ({} window, as of {})",
        "Overall health:".bold(),
        colorize_system(report.overall_health),
        report.window,
        report.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    print_table(
        "Scheduled jobs",
        report.cron_jobs.iter().map(JobRow::from).collect(),
    );

    let errors = &report.api_errors.totals;
    println!("{}", "API errors".bold());
    println!(
        "  {} of {} requests failed ({}%): {} client, {} server",
        errors.total, errors.requests, errors.error_rate, errors.client_errors, errors.server_errors
    );
}
