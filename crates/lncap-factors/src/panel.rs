//! Panel shaping: date keys, range filtering, grid alignment and the merge
//! with forward returns.
//!
//! Dates travel through frames as `Int32` day numbers (days from the common
//! era), which keeps joins and window keys on a plain integer column.

use crate::error::Result;
use crate::{DATE_COLUMN, INSTRUMENT_COLUMN};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeSet;

/// Column holding the one-day forward return.
pub const RETURN_COLUMN: &str = "future_return";

/// Frame key for a calendar date.
pub fn date_to_key(date: NaiveDate) -> i32 {
    date.num_days_from_ce()
}

/// Calendar date for a frame key, `None` when out of range.
pub fn key_to_date(key: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(key)
}

/// Keep rows dated within `[start, end]`.
pub fn date_range_filter(data: LazyFrame, start: NaiveDate, end: NaiveDate) -> LazyFrame {
    data.filter(
        col(DATE_COLUMN)
            .gt_eq(lit(date_to_key(start)))
            .and(col(DATE_COLUMN).lt_eq(lit(date_to_key(end)))),
    )
}

/// Reshape a long frame onto the full date x instrument grid.
///
/// Every observed date is paired with every observed instrument; pairs
/// without an observation carry null in `value_column`. Instruments whose
/// values are null on every date are dropped. The result is sorted by
/// `(date, instrument)` and keeps only the key columns and `value_column`.
pub fn align_panel(data: &DataFrame, value_column: &str) -> Result<DataFrame> {
    let dates: BTreeSet<i32> = data
        .column(DATE_COLUMN)?
        .as_materialized_series()
        .i32()?
        .into_iter()
        .flatten()
        .collect();
    let instruments: BTreeSet<String> = data
        .column(INSTRUMENT_COLUMN)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    let mut grid_dates = Vec::with_capacity(dates.len() * instruments.len());
    let mut grid_instruments = Vec::with_capacity(dates.len() * instruments.len());
    for date in &dates {
        for instrument in &instruments {
            grid_dates.push(*date);
            grid_instruments.push(instrument.clone());
        }
    }

    let grid = DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), grid_dates).into(),
        Series::new(INSTRUMENT_COLUMN.into(), grid_instruments).into(),
    ])?;

    let values = data.clone().lazy().select([
        col(DATE_COLUMN),
        col(INSTRUMENT_COLUMN),
        col(value_column),
    ]);

    let aligned = grid
        .lazy()
        .join(
            values,
            [col(DATE_COLUMN), col(INSTRUMENT_COLUMN)],
            [col(DATE_COLUMN), col(INSTRUMENT_COLUMN)],
            JoinArgs::new(JoinType::Left),
        )
        .with_column(
            col(value_column)
                .is_not_null()
                .cast(DataType::Int32)
                .sum()
                .over([col(INSTRUMENT_COLUMN)])
                .alias("__observed"),
        )
        .filter(col("__observed").gt(lit(0)))
        .drop(["__observed"])
        .sort([DATE_COLUMN, INSTRUMENT_COLUMN], SortMultipleOptions::default())
        .collect()?;

    Ok(aligned)
}

/// Inner-join factor scores with forward returns on `(date, instrument)`.
///
/// Rows where either the factor or the return is null are dropped.
pub fn merge_with_returns(factor: LazyFrame, returns: LazyFrame, factor_column: &str) -> LazyFrame {
    factor
        .join(
            returns.select([col(DATE_COLUMN), col(INSTRUMENT_COLUMN), col(RETURN_COLUMN)]),
            [col(DATE_COLUMN), col(INSTRUMENT_COLUMN)],
            [col(DATE_COLUMN), col(INSTRUMENT_COLUMN)],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(
            col(factor_column)
                .is_not_null()
                .and(col(RETURN_COLUMN).is_not_null()),
        )
        .sort([DATE_COLUMN, INSTRUMENT_COLUMN], SortMultipleOptions::default())
}
