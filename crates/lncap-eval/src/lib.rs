#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lncap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod correlation;
pub mod daily;
pub mod error;
pub mod regression;
pub mod summary;

// Re-export main types
pub use correlation::{pearson, rank_average, spearman};
pub use daily::{DailyStats, Observation, cumulative_ic, daily_stats};
pub use error::{EvalError, Result};
pub use regression::{OlsFit, add_constant, factor_beta, factor_t_value, ols};
pub use summary::{EvaluationSummary, summarize};
