//! Output formatting utilities

use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};
use vitals_engine::types::{JobHealth, SystemHealth};
use vitals_engine::{BucketStats, GroupStats, JobHealthReport};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a table of rows, or a dimmed placeholder when there are none.
pub fn print_table<T: Tabled>(title: &str, rows: Vec<T>) {
    println!("{}", title.bold());
    if rows.is_empty() {
        println!("  {}", "No results".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
    println!();
}

/// Serialize a whole report in a machine-readable format.
pub fn print_structured<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

pub fn colorize_system(health: SystemHealth) -> ColoredString {
    let label = health.to_string();
    match health {
        SystemHealth::Healthy => label.green(),
        SystemHealth::Degraded => label.yellow(),
        SystemHealth::Running => label.cyan(),
        SystemHealth::Unhealthy => label.red().bold(),
    }
}

pub fn colorize_job(health: JobHealth) -> ColoredString {
    let label = health.to_string();
    match health {
        JobHealth::Healthy => label.green(),
        JobHealth::Running => label.cyan(),
        JobHealth::Unhealthy => label.red(),
    }
}

/// One time-series bucket.
#[derive(Tabled)]
pub struct BucketRow {
    #[tabled(rename = "Bucket")]
    pub timestamp: String,
    #[tabled(rename = "Count")]
    pub requests: u64,
    #[tabled(rename = "Errors")]
    pub errors: u64,
    #[tabled(rename = "5xx")]
    pub server_errors: u64,
    #[tabled(rename = "Slow")]
    pub slow: u64,
    #[tabled(rename = "Error %")]
    pub error_rate: f64,
    #[tabled(rename = "p50")]
    pub p50: u64,
    #[tabled(rename = "p95")]
    pub p95: u64,
    #[tabled(rename = "p99")]
    pub p99: u64,
    #[tabled(rename = "Avg")]
    pub avg: u64,
}

impl From<&BucketStats> for BucketRow {
    fn from(bucket: &BucketStats) -> Self {
        let s = &bucket.stats;
        Self {
            timestamp: bucket.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            requests: s.requests,
            errors: s.errors,
            server_errors: s.server_errors,
            slow: s.slow,
            error_rate: s.error_rate,
            p50: s.p50,
            p95: s.p95,
            p99: s.p99,
            avg: s.avg_duration,
        }
    }
}

/// One dimension group.
#[derive(Tabled)]
pub struct GroupRow {
    #[tabled(rename = "Dimension")]
    pub key: String,
    #[tabled(rename = "Count")]
    pub requests: u64,
    #[tabled(rename = "Errors")]
    pub errors: u64,
    #[tabled(rename = "Error %")]
    pub error_rate: f64,
    #[tabled(rename = "p95")]
    pub p95: u64,
    #[tabled(rename = "Avg")]
    pub avg: u64,
    #[tabled(rename = "Breakdown")]
    pub breakdown: String,
}

impl From<&GroupStats> for GroupRow {
    fn from(group: &GroupStats) -> Self {
        let s = &group.stats;
        Self {
            key: group.key.clone(),
            requests: s.requests,
            errors: s.errors,
            error_rate: s.error_rate,
            p95: s.p95,
            avg: s.avg_duration,
            breakdown: group.sub_dimensions.join(", "),
        }
    }
}

/// One scheduled job.
#[derive(Tabled)]
pub struct JobRow {
    #[tabled(rename = "Job")]
    pub name: String,
    #[tabled(rename = "Health")]
    pub health: String,
    #[tabled(rename = "Last Run")]
    pub last_run: String,
    #[tabled(rename = "Last Status")]
    pub last_status: String,
    #[tabled(rename = "OK/Failed")]
    pub outcomes: String,
    #[tabled(rename = "Avg ms")]
    pub avg_ms: String,
}

impl From<&JobHealthReport> for JobRow {
    fn from(job: &JobHealthReport) -> Self {
        let (last_run, last_status) = match &job.last_execution {
            Some(last) => (
                last.started_at.format("%Y-%m-%d %H:%M").to_string(),
                last.status.to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        Self {
            name: job.job_name.clone(),
            health: colorize_job(job.health).to_string(),
            last_run,
            last_status,
            outcomes: format!("{}/{}", job.stats.all.successful, job.stats.all.failed),
            avg_ms: job
                .stats
                .avg_duration_ms
                .map_or_else(|| "-".to_string(), |ms| ms.to_string()),
        }
    }
}
