#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lncap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;

pub use export::{DailyRecord, ExportError, ExportFormat, Exporter, summary_metrics};
pub use report::{EvaluationReport, ReportError};
