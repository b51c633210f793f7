use thiserror::Error;
use vitals_types::TypesError;

/// Errors raised by event and execution store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed record at line {line}: {reason}")]
    Decode { line: usize, reason: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the telemetry query service.
///
/// An empty window is not an error: it yields a well-formed all-zero report.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid window: {0}")]
    InvalidWindow(TypesError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{store} store unavailable: {reason}")]
    StoreUnavailable { store: &'static str, reason: String },
}

impl TelemetryError {
    /// Wrap a store failure with the name of the store that failed.
    pub fn store(store: &'static str, err: StoreError) -> Self {
        TelemetryError::StoreUnavailable {
            store,
            reason: err.to_string(),
        }
    }
}

/// Convenience type alias for telemetry results.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_line() {
        let e = StoreError::Decode {
            line: 17,
            reason: "missing field `timestamp`".into(),
        };
        assert!(e.to_string().contains("line 17"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StoreError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn store_failure_keeps_store_name() {
        let e = TelemetryError::store("events", StoreError::Unavailable("connection reset".into()));
        let msg = e.to_string();
        assert!(msg.starts_with("events store unavailable"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn window_error_display() {
        let e = TelemetryError::InvalidWindow(TypesError::UnknownWindow("90d".into()));
        assert!(e.to_string().starts_with("invalid window"));
        assert!(e.to_string().contains("90d"));
    }
}
