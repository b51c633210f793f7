//! Command implementations

pub mod metrics;
pub mod ops;

use clap::Args;
use vitals_engine::MetricsQuery;

use crate::error::CliResult;

/// Flags shared by every metrics surface.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Look-back window (1h, 24h, 7d, 14d, 30d)
    #[arg(short, long, default_value = "24h")]
    pub window: String,

    /// Only include dimensions containing this text (case-insensitive)
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only include events at least this long (ms)
    #[arg(long, value_name = "MS")]
    pub min_duration: Option<u64>,

    /// Only include slow events
    #[arg(long)]
    pub slow_only: bool,

    /// Skip requests to administrative routes
    #[arg(long)]
    pub exclude_admin: bool,

    /// Length of the top-N lists
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

impl QueryArgs {
    /// Validate the window and build the engine query.
    pub fn to_query(&self) -> CliResult<MetricsQuery> {
        let query = MetricsQuery::parse(&self.window)?
            .with_dimension(self.filter.as_deref())
            .with_min_duration(self.min_duration)
            .with_slow_only(self.slow_only)
            .with_exclude_admin(self.exclude_admin)
            .with_top_n(self.top);
        query.validate()?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitals_engine::types::Window;
    use vitals_engine::TelemetryError;

    fn args(window: &str) -> QueryArgs {
        QueryArgs {
            window: window.to_string(),
            filter: Some("  ".to_string()),
            min_duration: Some(250),
            slow_only: true,
            exclude_admin: false,
            top: Some(3),
        }
    }

    #[test]
    fn test_to_query() {
        let query = args("7d").to_query().unwrap();
        assert_eq!(query.window, Window::SevenDays);
        assert_eq!(query.dimension_filter, None);
        assert_eq!(query.min_duration_ms, Some(250));
        assert_eq!(query.top_n, Some(3));
        assert!(query.slow_only);
    }

    #[test]
    fn test_unknown_window_is_rejected() {
        let err = args("2w").to_query().unwrap_err();
        assert!(matches!(
            err,
            crate::error::CliError::Telemetry(TelemetryError::InvalidWindow(_))
        ));
    }
}
