#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lncap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod collect;
pub mod error;
pub mod records;
pub mod source;
pub mod store;
pub mod tushare;

pub use collect::{FetchConfig, collect_market_caps, collect_prices, compute_forward_returns};
pub use error::{DataError, Result};
pub use records::{ConstituentRecord, DateRange, MarketCapRecord, PriceRecord};
pub use source::MarketDataSource;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
