//! Data pipeline for fetching and persisting index data.
//!
//! Wraps the Tushare collectors with a progress bar and the CSV layout the
//! evaluation step reads back.

use indicatif::{ProgressBar, ProgressStyle};
use lncap_data::store::{read_records, write_records};
use lncap_data::tushare::TushareClient;
use lncap_data::{
    ConstituentRecord, DataError, DateRange, FetchConfig, MarketCapRecord, PriceRecord,
    collect_market_caps, collect_prices, compute_forward_returns,
};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Constituent table file name.
pub(crate) const CONSTITUENTS_FILE: &str = "hs300_constituents.csv";
/// Market cap table file name.
pub(crate) const MARKET_CAP_FILE: &str = "hs300_mkt_cap.csv";
/// Close price and forward return table file name.
pub(crate) const RETURNS_FILE: &str = "hs300_returns.csv";

/// Error type for data pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DataPipelineError {
    /// Data fetch or storage error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    /// Invalid progress bar template.
    #[error("Progress bar error: {0}")]
    Template(String),
}

/// Progress bar over `len` per-stock requests.
pub(crate) fn new_progress_bar(len: u64) -> Result<ProgressBar, DataPipelineError> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map_err(|e| DataPipelineError::Template(e.to_string()))?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Path of `file` inside `dir`.
pub(crate) fn table_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(file)
}

/// Fetch index membership for the range.
pub(crate) async fn fetch_constituents(
    client: &TushareClient,
    index: &str,
    range: DateRange,
) -> Result<Vec<ConstituentRecord>, DataPipelineError> {
    let constituents = client.index_constituents(index, range).await?;
    if constituents.is_empty() {
        return Err(DataError::MissingData {
            symbol: index.to_string(),
            reason: format!("no constituents between {}", range),
        }
        .into());
    }
    Ok(constituents)
}

/// Fetch floating market caps for every instrument.
pub(crate) async fn fetch_market_caps(
    client: &TushareClient,
    instruments: &[String],
    range: DateRange,
    config: &FetchConfig,
    with_industry: bool,
) -> Result<Vec<MarketCapRecord>, DataPipelineError> {
    let industries = if with_industry {
        Some(client.stock_industries().await?)
    } else {
        None
    };

    let pb = new_progress_bar(instruments.len() as u64)?;
    pb.set_message(format!("Fetching market caps ({})...", config.cap_field));

    let result = collect_market_caps(
        client,
        instruments,
        range,
        config,
        industries.as_ref(),
        Some(&pb),
    )
    .await;

    match &result {
        Ok(records) => pb.finish_with_message(format!("Fetched {} rows", records.len())),
        Err(_) => pb.finish_with_message("Failed!"),
    }
    Ok(result?)
}

/// Fetch closes for every instrument and attach forward returns.
pub(crate) async fn fetch_returns(
    client: &TushareClient,
    instruments: &[String],
    range: DateRange,
    config: &FetchConfig,
) -> Result<Vec<PriceRecord>, DataPipelineError> {
    let pb = new_progress_bar(instruments.len() as u64)?;
    pb.set_message("Fetching close prices...");

    let result = collect_prices(client, instruments, range, config, Some(&pb)).await;

    match &result {
        Ok(records) => pb.finish_with_message(format!("Fetched {} rows", records.len())),
        Err(_) => pb.finish_with_message("Failed!"),
    }
    Ok(result?)
}

/// Write a table and report where it went.
pub(crate) fn save_table<T: serde::Serialize>(
    dir: &Path,
    file: &str,
    records: &[T],
) -> Result<PathBuf, DataPipelineError> {
    let path = table_path(dir, file);
    write_records(&path, records)?;
    println!("Wrote {} rows to {} ✓", records.len(), path.display());
    Ok(path)
}

/// Load market caps written by `fetch-caps`.
pub(crate) fn load_market_caps(path: &Path) -> Result<Vec<MarketCapRecord>, DataPipelineError> {
    Ok(read_records(path)?)
}

/// Load the returns table.
///
/// A file holding only close prices gets its forward returns computed here.
pub(crate) fn load_returns(path: &Path) -> Result<Vec<PriceRecord>, DataPipelineError> {
    let prices: Vec<PriceRecord> = read_records(path)?;
    if prices.iter().all(|p| p.future_return.is_none()) {
        return Ok(compute_forward_returns(prices));
    }
    Ok(prices)
}
