//! Tushare Pro data provider.

pub mod client;
pub mod table;

pub use client::{ClientConfig, DEFAULT_CAP_FIELD, TUSHARE_BASE_URL, TushareClient};
pub use table::ApiTable;
