#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lncap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod clean;
pub mod error;
pub mod panel;
pub mod size;
pub mod traits;

/// Date key column shared by every frame.
pub const DATE_COLUMN: &str = "date";

/// Instrument code column shared by every frame.
pub const INSTRUMENT_COLUMN: &str = "instrument";

pub use clean::{cross_sectional_standardize, fill_missing, mad_clip};
pub use error::{FactorError, Result};
pub use panel::{
    RETURN_COLUMN, align_panel, date_range_filter, date_to_key, key_to_date, merge_with_returns,
};
pub use size::{LogMarketCapConfig, LogMarketCapFactor, MARKET_CAP_COLUMN};
pub use traits::{Factor, StyleFactor};
