//! CLI error types

use thiserror::Error;
use vitals_engine::TelemetryError;

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML output failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;
