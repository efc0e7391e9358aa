//! The evaluation pipeline: record tables in, daily series and summary out.
//!
//! ```text
//! market caps ──> factor ──> align ──┐
//!                                    ├──> merge ──> daily stats ──> summary
//! prices (forward returns) ──────────┘
//! ```

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use lncap_data::{DateRange, MarketCapRecord, PriceRecord};
use lncap_eval::{DailyStats, EvaluationSummary, Observation, daily_stats, summarize};
use lncap_factors::{
    DATE_COLUMN, Factor, INSTRUMENT_COLUMN, LogMarketCapConfig, LogMarketCapFactor,
    MARKET_CAP_COLUMN, RETURN_COLUMN, StyleFactor, align_panel, date_range_filter, date_to_key,
    key_to_date, merge_with_returns,
};
use lncap_output::EvaluationReport;
use polars::prelude::*;

/// Close price column of the returns frame.
pub const CLOSE_COLUMN: &str = "close_price";

/// Frame with `date`, `instrument` and `mkt_cap_float` columns.
pub fn market_caps_to_frame(records: &[MarketCapRecord]) -> Result<DataFrame> {
    let dates: Vec<i32> = records.iter().map(|r| date_to_key(r.date)).collect();
    let instruments: Vec<&str> = records.iter().map(|r| r.instrument.as_str()).collect();
    let caps: Vec<f64> = records.iter().map(|r| r.mkt_cap_float).collect();

    Ok(DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), dates).into(),
        Series::new(INSTRUMENT_COLUMN.into(), instruments).into(),
        Series::new(MARKET_CAP_COLUMN.into(), caps).into(),
    ])?)
}

/// Frame with `date`, `instrument`, `close_price` and `future_return` columns.
pub fn returns_to_frame(records: &[PriceRecord]) -> Result<DataFrame> {
    let dates: Vec<i32> = records.iter().map(|r| date_to_key(r.date)).collect();
    let instruments: Vec<&str> = records.iter().map(|r| r.instrument.as_str()).collect();
    let closes: Vec<f64> = records.iter().map(|r| r.close_price).collect();
    let returns: Vec<Option<f64>> = records.iter().map(|r| r.future_return).collect();

    Ok(DataFrame::new(vec![
        Series::new(DATE_COLUMN.into(), dates).into(),
        Series::new(INSTRUMENT_COLUMN.into(), instruments).into(),
        Series::new(CLOSE_COLUMN.into(), closes).into(),
        Series::new(RETURN_COLUMN.into(), returns).into(),
    ])?)
}

/// Read merged rows back into observations.
///
/// Rows with a missing or non-finite factor or return are skipped.
pub fn frame_to_observations(df: &DataFrame, factor_column: &str) -> Result<Vec<Observation>> {
    let dates = df.column(DATE_COLUMN)?.as_materialized_series().i32()?;
    let instruments = df.column(INSTRUMENT_COLUMN)?.as_materialized_series().str()?;
    let factors = df.column(factor_column)?.as_materialized_series().f64()?;
    let returns = df.column(RETURN_COLUMN)?.as_materialized_series().f64()?;

    let observations = dates
        .into_iter()
        .zip(instruments)
        .zip(factors)
        .zip(returns)
        .filter_map(|(((date, instrument), factor), ret)| {
            let date = key_to_date(date?)?;
            let factor = factor.filter(|v| v.is_finite())?;
            let ret = ret.filter(|v| v.is_finite())?;
            Some(Observation::new(date, instrument?, factor, ret))
        })
        .collect();

    Ok(observations)
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Factor name.
    pub factor: String,
    /// Market cap rows without a usable logarithm, dropped before scoring.
    pub missing: usize,
    /// Merged factor / forward return panel.
    pub observations: Vec<Observation>,
    /// Per-date statistics, ascending by date.
    pub daily: Vec<DailyStats>,
    /// Summary over `daily`.
    pub summary: EvaluationSummary,
}

impl PipelineOutput {
    /// First and last evaluated dates.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.daily.first()?.date, self.daily.last()?.date))
    }

    /// Report over the evaluated period.
    pub fn report(&self) -> Option<EvaluationReport> {
        let (start, end) = self.period()?;
        Some(EvaluationReport::new(
            self.factor.clone(),
            start,
            end,
            self.summary.clone(),
        ))
    }
}

/// Runs the log market cap factor through cleaning, merge and evaluation.
#[derive(Debug, Default)]
pub struct FactorPipeline {
    factor: LogMarketCapFactor,
    range: Option<DateRange>,
}

impl FactorPipeline {
    /// Pipeline with the default factor configuration over all dates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom factor configuration.
    pub fn with_config(mut self, config: LogMarketCapConfig) -> Self {
        self.factor = LogMarketCapFactor::with_config(config);
        self
    }

    /// Restrict both tables to `range`.
    pub const fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Factor being evaluated.
    pub const fn factor(&self) -> &LogMarketCapFactor {
        &self.factor
    }

    fn restrict(&self, data: LazyFrame) -> LazyFrame {
        match self.range {
            Some(range) => date_range_filter(data, range.start(), range.end()),
            None => data,
        }
    }

    /// Factor scores on the aligned date x instrument grid.
    pub fn factor_panel(&self, caps: &[MarketCapRecord]) -> Result<DataFrame> {
        let frame = market_caps_to_frame(caps)?;
        self.factor.validate(&frame)?;

        let scores = self
            .factor
            .compute_scores(self.restrict(frame.lazy()))?
            .collect()?;
        Ok(align_panel(&scores, self.factor.name())?)
    }

    /// Run the full evaluation.
    ///
    /// # Errors
    /// * `EmptyPanel` when no (date, instrument) pair has both a score and a
    ///   forward return
    pub fn run(&self, caps: &[MarketCapRecord], prices: &[PriceRecord]) -> Result<PipelineOutput> {
        let name = self.factor.name().to_string();
        let in_range = self.restrict(market_caps_to_frame(caps)?.lazy()).collect()?;
        let missing = self.factor.count_missing(&in_range)?;

        let panel = self.factor_panel(caps)?;
        let returns = self.restrict(returns_to_frame(prices)?.lazy());
        let merged = merge_with_returns(panel.lazy(), returns, &name).collect()?;

        let observations = frame_to_observations(&merged, &name)?;
        if observations.is_empty() {
            return Err(PipelineError::EmptyPanel);
        }

        let daily = daily_stats(&observations);
        let summary = summarize(&daily);

        Ok(PipelineOutput {
            factor: name,
            missing,
            observations,
            daily,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lncap_data::compute_forward_returns;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 4, d).unwrap()
    }

    const NAMES: [&str; 4] = ["000001.SZ", "000002.SZ", "600000.SH", "600519.SH"];

    fn caps() -> Vec<MarketCapRecord> {
        let mut out = Vec::new();
        for d in 1..=3 {
            for (i, name) in NAMES.iter().enumerate() {
                let cap = 1.0e9 * (i as f64 + 1.0) * (1.0 + d as f64 / 100.0);
                out.push(MarketCapRecord::new(date(d), name.to_string(), cap));
            }
        }
        out
    }

    fn prices() -> Vec<PriceRecord> {
        let mut out = Vec::new();
        for d in 1..=4 {
            for (i, name) in NAMES.iter().enumerate() {
                // Small caps rally, large caps drift down
                let drift = 0.01 * (1.5 - i as f64);
                let close = 10.0 * (1.0 + drift).powi(d as i32);
                out.push(PriceRecord::new(date(d), name.to_string(), close));
            }
        }
        compute_forward_returns(out)
    }

    #[test]
    fn test_frames_have_expected_columns() {
        let caps = market_caps_to_frame(&caps()).unwrap();
        assert_eq!(caps.height(), 12);
        assert_eq!(caps.get_column_names().len(), 3);

        let returns = returns_to_frame(&prices()).unwrap();
        assert_eq!(returns.height(), 16);
        assert_eq!(returns.column(RETURN_COLUMN).unwrap().null_count(), 4);
    }

    #[test]
    fn test_frame_to_observations_skips_incomplete_rows() {
        let df = df![
            "date" => [date_to_key(date(1)), date_to_key(date(1)), date_to_key(date(2))],
            "instrument" => ["A", "B", "A"],
            "lncap" => [Some(0.5), Some(f64::NAN), Some(-0.5)],
            "future_return" => [Some(0.01), Some(0.02), None]
        ]
        .unwrap();

        let obs = frame_to_observations(&df, "lncap").unwrap();
        assert_eq!(obs, vec![Observation::new(date(1), "A", 0.5, 0.01)]);
    }

    #[test]
    fn test_run_detects_size_effect() {
        let output = FactorPipeline::new().run(&caps(), &prices()).unwrap();

        assert_eq!(output.factor, "lncap");
        assert_eq!(output.missing, 0);
        // Last price date has no forward return and no caps
        assert_eq!(output.observations.len(), 12);
        assert_eq!(output.daily.len(), 3);
        assert_eq!(output.summary.dates, 3);
        // Bigger names earn less
        assert_eq!(output.summary.ic_gt_0_prob, Some(0.0));
        assert!(output.summary.ic_mean.unwrap() < -0.5);

        let report = output.report().unwrap();
        assert_eq!(report.period_start, date(1));
        assert_eq!(report.period_end, date(3));
    }

    #[test]
    fn test_run_respects_range() {
        let range = DateRange::new(date(2), date(3)).unwrap();
        let output = FactorPipeline::new()
            .with_range(range)
            .run(&caps(), &prices())
            .unwrap();
        assert_eq!(output.daily.len(), 2);
        assert_eq!(output.period(), Some((date(2), date(3))));
    }

    #[test]
    fn test_run_counts_missing_caps() {
        let mut caps = caps();
        caps[0].mkt_cap_float = 0.0;
        caps[5].mkt_cap_float = -1.0;

        let output = FactorPipeline::new().run(&caps, &prices()).unwrap();
        assert_eq!(output.missing, 2);
        assert_eq!(output.observations.len(), 10);
    }

    #[test]
    fn test_missing_counts_only_evaluated_dates() {
        let mut caps = caps();
        // Day one lies outside the range, day two inside
        caps[0].mkt_cap_float = 0.0;
        caps[4].mkt_cap_float = -1.0;

        let range = DateRange::new(date(2), date(3)).unwrap();
        let output = FactorPipeline::new()
            .with_range(range)
            .run(&caps, &prices())
            .unwrap();
        assert_eq!(output.missing, 1);
        assert_eq!(output.observations.len(), 7);
    }

    #[test]
    fn test_run_without_overlap_is_empty() {
        let range = DateRange::new(date(4), date(4)).unwrap();
        let err = FactorPipeline::new()
            .with_range(range)
            .run(&caps(), &prices())
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyPanel));
    }
}
