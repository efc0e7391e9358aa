//! Report generation for factor evaluation.

use crate::export::summary_metrics;
use chrono::{DateTime, NaiveDate, Utc};
use lncap_eval::EvaluationSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Human-readable labels for the summary metrics, in report order.
const METRIC_LABELS: [&str; 10] = [
    "Mean abs(t)",
    "P(abs(t) > 2)",
    "Factor return mean",
    "Factor return std",
    "Factor return t",
    "P(factor return > 0)",
    "IC mean",
    "IC std",
    "IR",
    "P(IC > 0)",
];

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.6}", v))
}

/// Evaluation report for one factor over one period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Factor name.
    pub factor: String,

    /// First date of the evaluation period.
    pub period_start: NaiveDate,

    /// Last date of the evaluation period.
    pub period_end: NaiveDate,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Summary statistics.
    pub summary: EvaluationSummary,
}

impl EvaluationReport {
    /// Create a new report.
    pub fn new(
        factor: impl Into<String>,
        period_start: NaiveDate,
        period_end: NaiveDate,
        summary: EvaluationSummary,
    ) -> Self {
        Self {
            factor: factor.into(),
            period_start,
            period_end,
            timestamp: Utc::now(),
            summary,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Format as an ASCII table for terminal output.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nFactor Evaluation: {}\n", self.factor));
        output.push_str(&format!(
            "Period: {} to {} ({} dates)\n",
            self.period_start, self.period_end, self.summary.dates
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');

        output.push_str(&format!("{:<30} {:>20}\n", "Metric", "Value"));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        for (label, (_, value)) in METRIC_LABELS.iter().zip(summary_metrics(&self.summary)) {
            output.push_str(&format!("{:<30} {:>20}\n", label, format_value(value)));
        }

        output.push_str(&"=".repeat(60));
        output.push('\n');
        output
    }

    /// Format as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Factor Evaluation: {}\n\n", self.factor));
        output.push_str(&format!(
            "**Period:** {} to {} ({} dates)\n\n",
            self.period_start, self.period_end, self.summary.dates
        ));

        output.push_str("| Metric | Value |\n");
        output.push_str("|--------|-------|\n");
        for (label, (_, value)) in METRIC_LABELS.iter().zip(summary_metrics(&self.summary)) {
            output.push_str(&format!("| {} | {} |\n", label, format_value(value)));
        }

        output
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Factor Evaluation: {} ({} to {})",
            self.factor, self.period_start, self.period_end
        )?;
        writeln!(f, "  IC mean: {}", format_value(self.summary.ic_mean))?;
        writeln!(f, "  IR: {}", format_value(self.summary.ir))?;
        writeln!(f, "  Mean abs(t): {}", format_value(self.summary.t_abs_mean))?;
        Ok(())
    }
}
