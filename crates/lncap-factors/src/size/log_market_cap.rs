//! Log Market Capitalization Factor
//!
//! Measures company size using the natural logarithm of floating market
//! capitalization. Negative scores indicate smaller companies, positive scores
//! indicate larger companies.

use crate::clean::{DEFAULT_MAD_MULTIPLE, cross_sectional_standardize, fill_missing, mad_clip};
use crate::error::{FactorError, Result};
use crate::traits::{Factor, StyleFactor};
use crate::{DATE_COLUMN, INSTRUMENT_COLUMN};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Input column holding the floating market cap.
pub const MARKET_CAP_COLUMN: &str = "mkt_cap_float";

/// Configuration for the LogMarketCap factor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMarketCapConfig {
    /// Minimum market cap to include (default: None)
    pub min_market_cap: Option<f64>,
    /// Clipping width in MADs around the daily median (default: 5)
    pub mad_multiple: f64,
    /// Score assigned where standardization is undefined (default: 0)
    pub fill_value: f64,
}

impl Default for LogMarketCapConfig {
    fn default() -> Self {
        Self {
            min_market_cap: None,
            mad_multiple: DEFAULT_MAD_MULTIPLE,
            fill_value: 0.0,
        }
    }
}

/// LogMarketCap computes company size using natural logarithm of market capitalization
#[derive(Debug)]
pub struct LogMarketCapFactor {
    config: LogMarketCapConfig,
}

impl LogMarketCapFactor {
    /// Rows of `data` whose market cap has no finite logarithm.
    ///
    /// These are null, non-positive or non-finite caps, and they are dropped
    /// by [`Factor::compute_scores`].
    pub fn count_missing(&self, data: &DataFrame) -> Result<usize> {
        let caps = data
            .column(MARKET_CAP_COLUMN)?
            .as_materialized_series()
            .f64()?
            .clone();
        Ok(caps
            .into_iter()
            .filter(|v| !matches!(v, Some(x) if *x > 0.0 && x.is_finite()))
            .count())
    }
}

impl Factor for LogMarketCapFactor {
    fn name(&self) -> &str {
        "lncap"
    }

    fn required_columns(&self) -> &[&str] {
        &[DATE_COLUMN, INSTRUMENT_COLUMN, MARKET_CAP_COLUMN]
    }

    fn compute_scores(&self, data: LazyFrame) -> Result<LazyFrame> {
        if !(self.config.mad_multiple > 0.0) {
            return Err(FactorError::InvalidConfig(format!(
                "mad_multiple must be positive, got {}",
                self.config.mad_multiple
            )));
        }

        // 1. Drop caps without a finite logarithm, then apply the minimum
        let mut result = data.filter(
            col(MARKET_CAP_COLUMN)
                .gt(lit(0.0))
                .and(col(MARKET_CAP_COLUMN).lt(lit(f64::INFINITY))),
        );

        if let Some(min_cap) = self.config.min_market_cap {
            result = result.filter(col(MARKET_CAP_COLUMN).gt_eq(lit(min_cap)));
        }

        // 2. Compute ln(mkt_cap_float)
        // Polars doesn't have direct log methods, so we use apply with a custom function
        result = result.with_columns([col(MARKET_CAP_COLUMN)
            .apply(
                |c: Column| {
                    let s = c.as_materialized_series();
                    Ok(Some(s.f64()?.apply_values(|v| v.ln()).into_series().into()))
                },
                GetOutput::from_type(DataType::Float64),
            )
            .alias(self.name())]);

        // 3. Clip outliers at median +/- k * MAD by date
        result = mad_clip(result, self.name(), self.config.mad_multiple);

        // 4. Cross-sectionally standardize (mean=0, std=1) by date
        result = cross_sectional_standardize(result, self.name());

        // 5. Dates without dispersion get the fill value
        result = fill_missing(result, self.name(), self.config.fill_value);

        Ok(result.select([col(DATE_COLUMN), col(INSTRUMENT_COLUMN), col(self.name())]))
    }
}

impl StyleFactor for LogMarketCapFactor {
    type Config = LogMarketCapConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }
}

impl Default for LogMarketCapFactor {
    fn default() -> Self {
        Self::with_config(LogMarketCapConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scores(df: DataFrame) -> Vec<f64> {
        LogMarketCapFactor::default()
            .compute_scores(df.lazy())
            .unwrap()
            .collect()
            .unwrap()
            .column("lncap")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_no_null_iter()
            .collect()
    }

    #[test]
    fn test_factor_name() {
        let factor = LogMarketCapFactor::default();
        assert_eq!(factor.name(), "lncap");
    }

    #[test]
    fn test_required_columns() {
        let factor = LogMarketCapFactor::default();
        let cols = factor.required_columns();
        assert_eq!(cols.len(), 3);
        assert!(cols.contains(&"instrument"));
        assert!(cols.contains(&"date"));
        assert!(cols.contains(&"mkt_cap_float"));
    }

    #[test]
    fn test_config_defaults() {
        let config = LogMarketCapConfig::default();
        assert_eq!(config.min_market_cap, None);
        assert_eq!(config.mad_multiple, 5.0);
        assert_eq!(config.fill_value, 0.0);
    }

    #[test]
    fn test_custom_config() {
        let config = LogMarketCapConfig {
            min_market_cap: Some(1_000_000.0),
            ..LogMarketCapConfig::default()
        };
        let factor = LogMarketCapFactor::with_config(config);
        assert_eq!(factor.config().min_market_cap, Some(1_000_000.0));
    }

    #[test]
    fn test_log_then_standardize() {
        // ln values are 1, 2, 3: no clipping, z = -1, 0, 1
        let e = std::f64::consts::E;
        let df = df![
            "date" => [1i32, 1, 1],
            "instrument" => ["A", "B", "C"],
            "mkt_cap_float" => [e, e * e, e * e * e]
        ]
        .unwrap();

        let z = scores(df);
        assert_relative_eq!(z[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(z[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(z[2], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_positive_caps_dropped() {
        let df = df![
            "date" => [1i32, 1, 1, 1],
            "instrument" => ["A", "B", "C", "D"],
            "mkt_cap_float" => [10.0, 0.0, -5.0, 100.0]
        ]
        .unwrap();

        let factor = LogMarketCapFactor::default();
        assert_eq!(factor.count_missing(&df).unwrap(), 2);
        assert_eq!(scores(df).len(), 2);
    }

    #[test]
    fn test_single_member_date_filled() {
        let df = df![
            "date" => [1i32],
            "instrument" => ["A"],
            "mkt_cap_float" => [1.0e9]
        ]
        .unwrap();

        assert_eq!(scores(df), vec![0.0]);
    }

    #[test]
    fn test_validate_missing_column() {
        let df = df![
            "date" => [1i32],
            "instrument" => ["A"]
        ]
        .unwrap();

        let factor = LogMarketCapFactor::default();
        assert!(matches!(
            factor.validate(&df),
            Err(FactorError::MissingColumn(c)) if c == "mkt_cap_float"
        ));
    }

    #[test]
    fn test_invalid_mad_multiple() {
        let factor = LogMarketCapFactor::with_config(LogMarketCapConfig {
            mad_multiple: 0.0,
            ..LogMarketCapConfig::default()
        });
        let df = df![
            "date" => [1i32],
            "instrument" => ["A"],
            "mkt_cap_float" => [1.0]
        ]
        .unwrap();
        assert!(matches!(
            factor.compute_scores(df.lazy()),
            Err(FactorError::InvalidConfig(_))
        ));
    }
}
