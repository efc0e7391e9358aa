//! Pipeline errors.

use lncap_factors::FactorError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while running the evaluation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Factor computation failed
    #[error("Factor error: {0}")]
    Factor(#[from] FactorError),

    /// Frame construction or query failed
    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),

    /// Nothing left after merging scores with returns
    #[error("No observations with both a factor score and a forward return")]
    EmptyPanel,
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
