//! CLI configuration.
//!
//! Layered from built-in defaults, an optional file, and `VITALS__`-prefixed
//! environment variables (e.g. `VITALS__ENGINE__MAX_EVENTS=5000`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vitals_engine::{EngineConfig, JsonLinesStore};

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsConfig {
    /// Aggregation and health thresholds.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Where recorded telemetry is read from.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// JSON-lines input files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,

    #[serde(default = "default_executions_path")]
    pub executions_path: PathBuf,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            events_path: default_events_path(),
            executions_path: default_executions_path(),
        }
    }
}

impl SourcesConfig {
    /// Apply command-line overrides.
    pub fn overridden(mut self, events: Option<PathBuf>, executions: Option<PathBuf>) -> Self {
        if let Some(path) = events {
            self.events_path = path;
        }
        if let Some(path) = executions {
            self.executions_path = path;
        }
        self
    }

    pub fn store(&self) -> JsonLinesStore {
        JsonLinesStore::new()
            .with_events(&self.events_path)
            .with_executions(&self.executions_path)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_events_path() -> PathBuf {
    PathBuf::from("telemetry/events.jsonl")
}

fn default_executions_path() -> PathBuf {
    PathBuf::from("telemetry/job-executions.jsonl")
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl VitalsConfig {
    /// Load configuration from defaults, an optional file, and the environment.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&VitalsConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VITALS")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
