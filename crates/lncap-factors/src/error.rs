//! Error types for factor computation.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while computing factors.
#[derive(Debug, Error)]
pub enum FactorError {
    /// Polars computation failed
    #[error("Factor computation failed: {0}")]
    Computation(#[from] PolarsError),

    /// Input frame lacks a required column
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for factor operations.
pub type Result<T> = std::result::Result<T, FactorError>;
