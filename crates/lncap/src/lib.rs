#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lncap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;
pub mod universe;

// Re-export main types from sub-crates
pub use lncap_data as data;
pub use lncap_eval as eval;
pub use lncap_factors as factors;
pub use lncap_output as output;

pub use error::{PipelineError, Result};
pub use pipeline::{FactorPipeline, PipelineOutput};
pub use universe::{IndexCode, IndexUniverse, Universe};

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
