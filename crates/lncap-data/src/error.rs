//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Tushare API returned a non-zero status code
    #[error("Tushare API error {code}: {msg}")]
    TushareApi {
        /// Status code reported by the API
        code: i64,
        /// Message reported by the API
        msg: String,
    },

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// A requested field is absent from an API table
    #[error("Field '{field}' missing from '{api_name}' response")]
    MissingField {
        /// API endpoint that produced the table
        api_name: String,
        /// Field that was requested
        field: String,
    },

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Missing data
    #[error("Missing data for {symbol}: {reason}")]
    MissingData {
        /// Symbol that was queried
        symbol: String,
        /// Reason for missing data
        reason: String,
    },

    /// Invalid symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// No API token was configured
    #[error("No Tushare API token configured")]
    MissingToken,

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
