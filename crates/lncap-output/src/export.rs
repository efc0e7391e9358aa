//! Export functionality for factor evaluation results.
//!
//! This module provides CSV and JSON export of the daily IC / t-value series
//! and of the evaluation summary.

use chrono::NaiveDate;
use lncap_eval::{DailyStats, EvaluationSummary, cumulative_ic};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// One row of the exported daily series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    /// Date.
    pub date: NaiveDate,

    /// Cross-section size.
    pub n: usize,

    /// Spearman IC.
    pub ic: Option<f64>,

    /// Running sum of ICs up to this date.
    pub cumulative_ic: f64,

    /// t-value of the factor slope.
    pub t_value: Option<f64>,

    /// Factor slope.
    pub beta: Option<f64>,

    /// Mean forward return.
    pub mean_return: f64,

    /// Standard deviation of forward returns.
    pub std_return: Option<f64>,
}

impl DailyRecord {
    /// Build the export rows for a daily series, attaching the cumulative IC.
    pub fn from_daily(daily: &[DailyStats]) -> Vec<Self> {
        daily
            .iter()
            .zip(cumulative_ic(daily))
            .map(|(day, cumulative_ic)| Self {
                date: day.date,
                n: day.n,
                ic: day.ic,
                cumulative_ic,
                t_value: day.t_value,
                beta: day.beta,
                mean_return: day.mean_return,
                std_return: day.std_return,
            })
            .collect()
    }
}

/// Named summary metrics in report order.
pub fn summary_metrics(summary: &EvaluationSummary) -> [(&'static str, Option<f64>); 10] {
    [
        ("t_abs_mean", summary.t_abs_mean),
        ("t_abs_gt_2_prob", summary.t_abs_gt_2_prob),
        ("factor_return_mean", summary.factor_return_mean),
        ("factor_return_std", summary.factor_return_std),
        ("factor_return_t", summary.factor_return_t),
        ("factor_return_gt_0_prob", summary.factor_return_gt_0_prob),
        ("ic_mean", summary.ic_mean),
        ("ic_std", summary.ic_std),
        ("ir", summary.ir),
        ("ic_gt_0_prob", summary.ic_gt_0_prob),
    ]
}

/// Flattened summary metric for CSV export.
#[derive(Debug, Serialize, Deserialize)]
struct MetricFlat {
    metric: String,
    value: Option<f64>,
}

fn csv_to_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for Vec<DailyRecord> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in self {
                    wtr.serialize(record)?;
                }
                csv_to_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for EvaluationSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.serialize(MetricFlat {
                    metric: "dates".to_string(),
                    value: Some(self.dates as f64),
                })?;
                for (metric, value) in summary_metrics(self) {
                    wtr.serialize(MetricFlat {
                        metric: metric.to_string(),
                        value,
                    })?;
                }
                csv_to_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
