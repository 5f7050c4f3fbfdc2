use thiserror::Error;

/// fieldmetrics error types
#[derive(Error, Debug)]
pub enum FieldMetricsError {
    /// Failed to parse a record file or response body
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Record source could not deliver data
    #[error("source error: {0}")]
    Source(String),

    /// Snapshot cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for fieldmetrics
pub type Result<T> = std::result::Result<T, FieldMetricsError>;
