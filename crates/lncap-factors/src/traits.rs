//! Factor traits.

use crate::error::{FactorError, Result};
use polars::prelude::*;

/// A cross-sectional factor computed from a `(date, instrument, ...)` frame.
pub trait Factor {
    /// Unique factor name, also used as the output column name.
    fn name(&self) -> &str;

    /// Columns the input frame must carry.
    fn required_columns(&self) -> &[&str];

    /// Compute factor scores.
    ///
    /// The result has columns `date`, `instrument` and [`Factor::name`].
    fn compute_scores(&self, data: LazyFrame) -> Result<LazyFrame>;

    /// Check that `data` carries every required column.
    fn validate(&self, data: &DataFrame) -> Result<()> {
        let names = data.get_column_names();
        for required in self.required_columns() {
            if !names.iter().any(|n| n.as_str() == *required) {
                return Err(FactorError::MissingColumn((*required).to_string()));
            }
        }
        Ok(())
    }
}

/// A factor parameterized by a configuration value.
pub trait StyleFactor: Factor + Sized {
    /// Configuration type.
    type Config: Default;

    /// Build the factor from a configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Current configuration.
    fn config(&self) -> &Self::Config;
}
