use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for dashboard configuration operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Error type returned by dataset loading functions.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input does not conform to the provided schema (missing required fields/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Configuration errors raised when wiring views to a dashboard.
///
/// These are programmer errors, reported synchronously at registration time. Malformed record data
/// never produces an error; such records are silently left out of the affected aggregation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DashboardError {
    /// A duration view was declared without the field holding the end timestamp.
    #[error("duration view on '{start_field}' requires an end field")]
    MissingEndField { start_field: String },

    /// A view references a field the dataset schema does not declare.
    #[error("unknown field '{field}' (available: {available:?})")]
    UnknownField {
        field: String,
        available: Vec<String>,
    },

    /// No view is registered under the given id.
    #[error("unknown view id {0}")]
    UnknownView(u64),

    /// Dashboard options could not be decoded.
    #[error("invalid dashboard options: {0}")]
    InvalidOptions(String),
}
