//! Sequential per-instrument acquisition.
//!
//! One request per unique constituent, a fixed pause after every successful
//! request, and failures reported as warnings without aborting the run.

use crate::error::{DataError, Result};
use crate::records::{ConstituentRecord, DateRange, MarketCapRecord, PriceRecord};
use crate::source::MarketDataSource;
use crate::tushare::DEFAULT_CAP_FIELD;
use indicatif::ProgressBar;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Default pause between requests.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(500);

/// Configuration for the acquisition loop.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Pause after each successful request.
    pub rate_limit_delay: Duration,
    /// Valuation field read as the floating market cap.
    pub cap_field: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay: DEFAULT_RATE_LIMIT,
            cap_field: DEFAULT_CAP_FIELD.to_string(),
        }
    }
}

/// Unique instruments in order of first appearance.
pub fn unique_instruments(constituents: &[ConstituentRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    constituents
        .iter()
        .filter(|c| seen.insert(c.instrument.as_str()))
        .map(|c| c.instrument.clone())
        .collect()
}

/// Fetch floating market caps for every instrument.
///
/// When `industries` is given, each record is labelled with its instrument's
/// industry.
pub async fn collect_market_caps<S: MarketDataSource>(
    source: &S,
    instruments: &[String],
    range: DateRange,
    config: &FetchConfig,
    industries: Option<&HashMap<String, String>>,
    progress: Option<&ProgressBar>,
) -> Result<Vec<MarketCapRecord>> {
    let cap_field = config.cap_field.as_str();
    let mut records = collect_each(instruments, config, progress, move |code| async move {
        source.market_caps(&code, range, cap_field).await
    })
    .await?;

    if let Some(industries) = industries {
        for record in &mut records {
            record.industry = industries.get(&record.instrument).cloned();
        }
    }

    records.sort_by(|a, b| (a.date, &a.instrument).cmp(&(b.date, &b.instrument)));
    Ok(records)
}

/// Fetch close prices for every instrument and attach forward returns.
pub async fn collect_prices<S: MarketDataSource>(
    source: &S,
    instruments: &[String],
    range: DateRange,
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
) -> Result<Vec<PriceRecord>> {
    let prices = collect_each(instruments, config, progress, move |code| async move {
        source.closes(&code, range).await
    })
    .await?;

    Ok(compute_forward_returns(prices))
}

async fn collect_each<T, F, Fut>(
    instruments: &[String],
    config: &FetchConfig,
    progress: Option<&ProgressBar>,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut all = Vec::new();
    let mut fetched = 0usize;

    for code in instruments {
        if let Some(pb) = progress {
            pb.set_message(code.clone());
        }

        match fetch(code.clone()).await {
            Ok(batch) => {
                if !batch.is_empty() {
                    fetched += 1;
                    all.extend(batch);
                }
                sleep(config.rate_limit_delay).await;
            }
            Err(e) => warn(progress, &format!("Failed to fetch data for {}: {}", code, e)),
        }

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    if fetched == 0 {
        return Err(DataError::MissingData {
            symbol: "batch".to_string(),
            reason: "No data fetched for any symbol".to_string(),
        });
    }

    Ok(all)
}

fn warn(progress: Option<&ProgressBar>, message: &str) {
    if let Some(pb) = progress {
        pb.suspend(|| eprintln!("Warning: {}", message));
    } else {
        eprintln!("Warning: {}", message);
    }
}

/// Fill `future_return = close[next] / close[date] - 1` per instrument.
///
/// Each instrument is ordered by ascending date first. The last date of each
/// instrument, and any date with a zero close, keeps `None`. The output is
/// sorted by `(date, instrument)`.
pub fn compute_forward_returns(mut prices: Vec<PriceRecord>) -> Vec<PriceRecord> {
    prices.sort_by(|a, b| (&a.instrument, a.date).cmp(&(&b.instrument, b.date)));

    for i in 0..prices.len() {
        let next = prices
            .get(i + 1)
            .filter(|n| n.instrument == prices[i].instrument)
            .map(|n| n.close_price);

        let current = prices[i].close_price;
        prices[i].future_return = next
            .filter(|_| current != 0.0)
            .map(|next| next / current - 1.0)
            .filter(|r| r.is_finite());
    }

    prices.sort_by(|a, b| (a.date, &a.instrument).cmp(&(b.date, &b.instrument)));
    prices
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 4, d).unwrap()
    }

    fn price(d: u32, code: &str, close: f64) -> PriceRecord {
        PriceRecord::new(date(d), code.to_string(), close)
    }

    #[test]
    fn test_unique_instruments_keeps_first_order() {
        let constituents = vec![
            ConstituentRecord::new(date(30), "B".to_string()),
            ConstituentRecord::new(date(30), "A".to_string()),
            ConstituentRecord::new(date(29), "B".to_string()),
            ConstituentRecord::new(date(29), "C".to_string()),
        ];
        assert_eq!(unique_instruments(&constituents), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_forward_returns_descending_input() {
        // The API returns the newest date first
        let prices = vec![
            price(3, "A", 12.0),
            price(2, "A", 11.0),
            price(1, "A", 10.0),
        ];
        let out = compute_forward_returns(prices);

        assert_eq!(out[0].date, date(1));
        assert_relative_eq!(out[0].future_return.unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(out[1].future_return.unwrap(), 1.0 / 11.0, epsilon = 1e-12);
        assert!(out[2].future_return.is_none());
    }

    #[test]
    fn test_forward_returns_do_not_cross_instruments() {
        let prices = vec![price(1, "A", 10.0), price(1, "B", 20.0), price(2, "B", 30.0)];
        let out = compute_forward_returns(prices);

        let a = out.iter().find(|p| p.instrument == "A").unwrap();
        assert!(a.future_return.is_none());

        let b1 = out
            .iter()
            .find(|p| p.instrument == "B" && p.date == date(1))
            .unwrap();
        assert_relative_eq!(b1.future_return.unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_returns_zero_close() {
        let prices = vec![price(1, "A", 0.0), price(2, "A", 5.0)];
        let out = compute_forward_returns(prices);
        assert!(out.iter().all(|p| p.future_return.is_none()));
    }

    #[test]
    fn test_forward_returns_sorted_by_date_then_instrument() {
        let prices = vec![price(2, "B", 1.0), price(1, "B", 1.0), price(1, "A", 1.0)];
        let out = compute_forward_returns(prices);
        let keys: Vec<_> = out.iter().map(|p| (p.date, p.instrument.as_str())).collect();
        assert_eq!(keys, vec![(date(1), "A"), (date(1), "B"), (date(2), "B")]);
    }
}
