use thiserror::Error;

/// Errors raised while building or parsing data-model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("unknown window '{0}' (expected one of 1h, 24h, 7d, 14d, 30d)")]
    UnknownWindow(String),

    #[error("unknown job status '{0}' (expected RUNNING, SUCCESS or FAILED)")]
    UnknownJobStatus(String),
}

/// Convenience type alias for data-model results.
pub type TypesResult<T> = Result<T, TypesError>;
