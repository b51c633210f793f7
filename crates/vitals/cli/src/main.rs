//! Vitals CLI - telemetry reports from the terminal
//!
//! Reads recorded request, data-access and job telemetry from JSON-lines
//! files and prints:
//! - Request, endpoint-performance, data-access and job metrics
//! - Scheduled-job health and the overall operational verdict

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitals_engine::TelemetryQueryService;

mod commands;
mod config;
mod error;
mod output;

use commands::metrics::{GroupBy, MetricsSurface};
use commands::{metrics, ops, QueryArgs};
use config::{LoggingConfig, VitalsConfig};
use error::CliResult;

/// Vitals CLI application
#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "Vitals - telemetry aggregation and operational health", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "VITALS_CONFIG", global = true)]
    config: Option<String>,

    /// Events file (JSON lines); overrides the configured path
    #[arg(long, global = true)]
    events: Option<PathBuf>,

    /// Job executions file (JSON lines); overrides the configured path
    #[arg(long, global = true)]
    executions: Option<PathBuf>,

    /// Evaluate as of this RFC 3339 instant instead of the current time
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// HTTP request metrics grouped by route
    Requests(QueryArgs),

    /// Endpoint performance grouped by method and route
    Perf {
        #[command(flatten)]
        query: QueryArgs,

        /// Requests at or above this duration count as slow (ms)
        #[arg(long, value_name = "MS")]
        slow_threshold: Option<u64>,
    },

    /// Data-access metrics grouped by model or operation
    Queries {
        #[command(flatten)]
        query: QueryArgs,

        /// Grouping axis
        #[arg(long, value_enum, default_value_t = GroupBy::Model)]
        group_by: GroupBy,
    },

    /// Scheduled-job duration metrics
    Jobs(QueryArgs),

    /// Scheduled-job health, API errors and overall status
    Ops {
        /// Look-back window (1h, 24h, 7d, 14d, 30d)
        #[arg(short, long, default_value = "24h")]
        window: String,
    },

    /// Show the effective configuration
    Config,
}

fn init_tracing(verbose: bool, logging: &LoggingConfig) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Load config before logging so the configured level applies
    let config = VitalsConfig::load(cli.config.as_deref())?;
    init_tracing(cli.verbose, &config.logging);

    let sources = config.sources.clone().overridden(cli.events, cli.executions);
    let store = Arc::new(sources.store());
    let service = TelemetryQueryService::new(store.clone(), store, config.engine.clone());
    let now = cli.now.unwrap_or_else(Utc::now);
    tracing::debug!(
        events = %sources.events_path.display(),
        executions = %sources.executions_path.display(),
        %now,
        "sources resolved"
    );

    match cli.command {
        Commands::Requests(query) => {
            metrics::execute(MetricsSurface::Requests, &query, &service, now, cli.output).await
        }
        Commands::Perf {
            query,
            slow_threshold,
        } => {
            let surface = MetricsSurface::Perf {
                slow_threshold_ms: slow_threshold,
            };
            metrics::execute(surface, &query, &service, now, cli.output).await
        }
        Commands::Queries { query, group_by } => {
            let surface = MetricsSurface::Queries { group_by };
            metrics::execute(surface, &query, &service, now, cli.output).await
        }
        Commands::Jobs(query) => {
            metrics::execute(MetricsSurface::Jobs, &query, &service, now, cli.output).await
        }
        Commands::Ops { window } => ops::execute(&window, &service, now, cli.output).await,
        Commands::Config => {
            let config = VitalsConfig {
                sources,
                ..config
            };
            match cli.output {
                output::OutputFormat::Json => output::print_structured(&config, cli.output),
                _ => output::print_structured(&config, output::OutputFormat::Yaml),
            }
        }
    }
}
