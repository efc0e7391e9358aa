//! Error types for factor evaluation.

use thiserror::Error;

/// Errors that can occur during evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    /// Dimension mismatch between inputs
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Actual dimension
        actual: usize,
    },

    /// Insufficient data for estimation
    #[error("Insufficient data: need more than {parameters} observations, got {observations}")]
    InsufficientData {
        /// Number of observations
        observations: usize,
        /// Number of parameters to estimate
        parameters: usize,
    },

    /// Design matrix has no unique least squares solution
    #[error("Singular design matrix")]
    SingularMatrix,
}

/// Result type for evaluation operations.
pub type Result<T> = std::result::Result<T, EvalError>;
