//! Glue between the CLI and the library crates.
//!
//! Token lookup, progress reporting around the Tushare collectors, and the
//! CSV table layout shared by the fetch and evaluate commands.

pub(crate) mod config;
pub(crate) mod data_pipeline;
