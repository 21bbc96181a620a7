use thiserror::Error;

/// Errors surfaced by loading, exporting and reporting.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The header row does not carry one of the required columns.
    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

/// Errors raised by a forecasting model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("insufficient data: required {required}, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("duplicate timestamp {0}")]
    DuplicateTimestamp(chrono::NaiveDate),

    #[error("timestamps are not in ascending order at {0}")]
    UnorderedTimestamps(chrono::NaiveDate),

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Fitting produced NaN or infinite state.
    #[error("numeric failure: {0}")]
    NonFinite(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
