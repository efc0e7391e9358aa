//! Cross-sectional cleaning steps.
//!
//! Each step operates per date on one value column and leaves the other
//! columns untouched.

use crate::DATE_COLUMN;
use polars::prelude::*;

/// Default clipping width in MADs.
pub const DEFAULT_MAD_MULTIPLE: f64 = 5.0;

/// Dispersion below which a date is treated as all-equal.
pub const STD_EPSILON: f64 = 1e-12;

/// Clip values to `[median - k * MAD, median + k * MAD]` within each date.
///
/// MAD is the unscaled median absolute deviation from the date's median.
/// When MAD is zero every value of the date collapses onto the median.
pub fn mad_clip(data: LazyFrame, value_column: &str, k: f64) -> LazyFrame {
    data.with_column(
        col(value_column)
            .median()
            .over([col(DATE_COLUMN)])
            .alias("__median"),
    )
    .with_column((col(value_column) - col("__median")).alias("__dev"))
    .with_column(
        when(col("__dev").lt(lit(0.0)))
            .then(lit(0.0) - col("__dev"))
            .otherwise(col("__dev"))
            .alias("__abs_dev"),
    )
    .with_column(
        col("__abs_dev")
            .median()
            .over([col(DATE_COLUMN)])
            .alias("__mad"),
    )
    .with_columns([
        (col("__median") - lit(k) * col("__mad")).alias("__lower"),
        (col("__median") + lit(k) * col("__mad")).alias("__upper"),
    ])
    .with_column(
        when(col(value_column).lt(col("__lower")))
            .then(col("__lower"))
            .when(col(value_column).gt(col("__upper")))
            .then(col("__upper"))
            .otherwise(col(value_column))
            .alias(value_column),
    )
    .drop(["__median", "__dev", "__abs_dev", "__mad", "__lower", "__upper"])
}

/// Cross-sectional z-score: `(x - mean) / std` within each date.
///
/// Uses the sample standard deviation. Dates with a single member or no
/// dispersion get null, to be filled by [`fill_missing`].
pub fn cross_sectional_standardize(data: LazyFrame, value_column: &str) -> LazyFrame {
    data.with_columns([
        col(value_column)
            .mean()
            .over([col(DATE_COLUMN)])
            .alias("__mean"),
        col(value_column)
            .std(1)
            .over([col(DATE_COLUMN)])
            .alias("__std"),
    ])
    .with_column(
        when(col("__std").gt(lit(STD_EPSILON)))
            .then((col(value_column) - col("__mean")) / col("__std"))
            .otherwise(lit(NULL).cast(DataType::Float64))
            .alias(value_column),
    )
    .drop(["__mean", "__std"])
}

/// Replace nulls in `value_column` with `value`.
pub fn fill_missing(data: LazyFrame, value_column: &str, value: f64) -> LazyFrame {
    data.with_column(col(value_column).fill_null(lit(value)).alias(value_column))
}
