//! Summary statistics over the daily series.

use crate::daily::DailyStats;
use serde::{Deserialize, Serialize};

/// Threshold on |t| counted as significant.
pub const T_SIGNIFICANCE: f64 = 2.0;

/// Aggregate evaluation of a factor over all dates.
///
/// Each statistic only uses the dates on which its inputs are defined and is
/// `None` when there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    /// Number of dates in the daily series
    pub dates: usize,
    /// Mean of |t|
    pub t_abs_mean: Option<f64>,
    /// Share of dates with |t| > 2
    pub t_abs_gt_2_prob: Option<f64>,
    /// Mean over dates of the cross-sectional mean forward return
    pub factor_return_mean: Option<f64>,
    /// Mean over dates of the cross-sectional return standard deviation
    pub factor_return_std: Option<f64>,
    /// Mean over dates of mean return / return standard deviation
    pub factor_return_t: Option<f64>,
    /// Share of dates with a positive mean return
    pub factor_return_gt_0_prob: Option<f64>,
    /// Mean IC
    pub ic_mean: Option<f64>,
    /// Sample standard deviation of the IC
    pub ic_std: Option<f64>,
    /// Information ratio of the IC (mean / std)
    pub ir: Option<f64>,
    /// Share of dates with a positive IC
    pub ic_gt_0_prob: Option<f64>,
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

fn share(values: &[f64], predicate: impl Fn(f64) -> bool) -> Option<f64> {
    (!values.is_empty())
        .then(|| values.iter().filter(|v| predicate(**v)).count() as f64 / values.len() as f64)
}

/// Summarize a daily series.
///
/// Days with an undefined IC or t-value are left out of every statistic built
/// from that series, the shares included: `ic_gt_0_prob` and
/// `t_abs_gt_2_prob` divide by the number of defined days, not by `dates`.
pub fn summarize(daily: &[DailyStats]) -> EvaluationSummary {
    let t_abs: Vec<f64> = daily.iter().filter_map(|d| d.t_value).map(f64::abs).collect();
    let means: Vec<f64> = daily
        .iter()
        .map(|d| d.mean_return)
        .filter(|m| m.is_finite())
        .collect();
    let stds: Vec<f64> = daily.iter().filter_map(|d| d.std_return).collect();
    let ratios: Vec<f64> = daily
        .iter()
        .filter_map(|d| match d.std_return {
            Some(s) if s > 0.0 => Some(d.mean_return / s),
            _ => None,
        })
        .filter(|r| r.is_finite())
        .collect();
    let ics: Vec<f64> = daily.iter().filter_map(|d| d.ic).collect();

    let ic_mean = mean(&ics);
    let ic_std = sample_std(&ics);
    let ir = match (ic_mean, ic_std) {
        (Some(m), Some(s)) if s > 0.0 => Some(m / s),
        _ => None,
    };

    EvaluationSummary {
        dates: daily.len(),
        t_abs_mean: mean(&t_abs),
        t_abs_gt_2_prob: share(&t_abs, |t| t > T_SIGNIFICANCE),
        factor_return_mean: mean(&means),
        factor_return_std: mean(&stds),
        factor_return_t: mean(&ratios),
        factor_return_gt_0_prob: share(&means, |m| m > 0.0),
        ic_mean,
        ic_std,
        ir,
        ic_gt_0_prob: share(&ics, |ic| ic > 0.0),
    }
}
