//! Per-date evaluation of factor scores against forward returns.

use crate::correlation::spearman;
use crate::regression::{factor_beta, factor_t_value};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One merged panel row: a factor score and the return that followed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date
    pub date: NaiveDate,
    /// Instrument code
    pub instrument: String,
    /// Cleaned factor score
    pub factor: f64,
    /// One-day forward return
    pub future_return: f64,
}

impl Observation {
    /// Create a new observation.
    pub fn new(date: NaiveDate, instrument: impl Into<String>, factor: f64, future_return: f64) -> Self {
        Self {
            date,
            instrument: instrument.into(),
            factor,
            future_return,
        }
    }
}

/// Cross-sectional statistics for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    /// Date
    pub date: NaiveDate,
    /// Number of instruments in the cross-section
    pub n: usize,
    /// Spearman IC between factor and forward return
    pub ic: Option<f64>,
    /// t-statistic of the factor slope in `return = a + b * factor`
    pub t_value: Option<f64>,
    /// Factor slope in `return = a + b * factor`
    pub beta: Option<f64>,
    /// Mean forward return of the cross-section
    pub mean_return: f64,
    /// Sample standard deviation of forward returns
    pub std_return: Option<f64>,
}

/// Compute [`DailyStats`] for every date in `panel`, in ascending date order.
pub fn daily_stats(panel: &[Observation]) -> Vec<DailyStats> {
    let mut by_date: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for obs in panel {
        let entry = by_date.entry(obs.date).or_default();
        entry.0.push(obs.factor);
        entry.1.push(obs.future_return);
    }

    by_date
        .into_iter()
        .map(|(date, (factor, returns))| {
            let n = returns.len();
            let mean_return = returns.iter().sum::<f64>() / n as f64;
            let std_return = (n >= 2).then(|| {
                let ss: f64 = returns.iter().map(|r| (r - mean_return).powi(2)).sum();
                (ss / (n - 1) as f64).sqrt()
            });

            DailyStats {
                date,
                n,
                ic: spearman(&factor, &returns),
                t_value: factor_t_value(&factor, &returns),
                beta: factor_beta(&factor, &returns),
                mean_return,
                std_return,
            }
        })
        .collect()
}

/// Running sum of the defined ICs, one entry per day.
///
/// Days with an undefined IC repeat the previous total.
pub fn cumulative_ic(daily: &[DailyStats]) -> Vec<f64> {
    daily
        .iter()
        .scan(0.0, |total, day| {
            *total += day.ic.unwrap_or(0.0);
            Some(*total)
        })
        .collect()
}
