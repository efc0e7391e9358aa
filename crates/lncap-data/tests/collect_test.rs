//! Integration tests for the acquisition loop against an in-memory source.

use chrono::NaiveDate;
use lncap_data::{
    ConstituentRecord, DataError, DateRange, FetchConfig, MarketCapRecord, MarketDataSource,
    PriceRecord, Result, collect::unique_instruments, collect_market_caps, collect_prices,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 4, d).unwrap()
}

fn range() -> DateRange {
    DateRange::new(date(1), date(30)).unwrap()
}

fn config() -> FetchConfig {
    FetchConfig {
        rate_limit_delay: Duration::ZERO,
        ..FetchConfig::default()
    }
}

/// Serves canned series and records every instrument it was asked for.
#[derive(Default)]
struct InMemorySource {
    caps: HashMap<String, Vec<MarketCapRecord>>,
    closes: HashMap<String, Vec<PriceRecord>>,
    failing: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl InMemorySource {
    fn with_caps(mut self, code: &str, values: &[(u32, f64)]) -> Self {
        let series = values
            .iter()
            .map(|&(d, v)| MarketCapRecord::new(date(d), code.to_string(), v))
            .collect();
        self.caps.insert(code.to_string(), series);
        self
    }

    fn with_closes(mut self, code: &str, values: &[(u32, f64)]) -> Self {
        let series = values
            .iter()
            .map(|&(d, v)| PriceRecord::new(date(d), code.to_string(), v))
            .collect();
        self.closes.insert(code.to_string(), series);
        self
    }

    fn failing(mut self, code: &str) -> Self {
        self.failing.push(code.to_string());
        self
    }

    fn check(&self, instrument: &str) -> Result<()> {
        self.calls.borrow_mut().push(instrument.to_string());
        if self.failing.iter().any(|f| f == instrument) {
            return Err(DataError::Http(format!("{} returned HTTP 500", instrument)));
        }
        Ok(())
    }
}

impl MarketDataSource for InMemorySource {
    async fn constituents(
        &self,
        _index_code: &str,
        _range: DateRange,
    ) -> Result<Vec<ConstituentRecord>> {
        Ok(Vec::new())
    }

    async fn market_caps(
        &self,
        instrument: &str,
        _range: DateRange,
        _cap_field: &str,
    ) -> Result<Vec<MarketCapRecord>> {
        self.check(instrument)?;
        Ok(self.caps.get(instrument).cloned().unwrap_or_default())
    }

    async fn closes(&self, instrument: &str, _range: DateRange) -> Result<Vec<PriceRecord>> {
        self.check(instrument)?;
        Ok(self.closes.get(instrument).cloned().unwrap_or_default())
    }

    async fn industries(&self) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

#[tokio::test]
async fn test_failures_are_skipped() {
    let source = InMemorySource::default()
        .with_caps("A", &[(1, 100.0), (2, 110.0)])
        .failing("B")
        .with_caps("C", &[(1, 50.0)]);
    let instruments = vec!["A".to_string(), "B".to_string(), "C".to_string()];

    let records = collect_market_caps(&source, &instruments, range(), &config(), None, None)
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.instrument != "B"));
    assert_eq!(*source.calls.borrow(), instruments);
}

#[tokio::test]
async fn test_records_sorted_by_date_then_instrument() {
    let source = InMemorySource::default()
        .with_caps("B", &[(2, 1.0), (1, 1.0)])
        .with_caps("A", &[(2, 1.0)]);
    let instruments = vec!["B".to_string(), "A".to_string()];

    let records = collect_market_caps(&source, &instruments, range(), &config(), None, None)
        .await
        .unwrap();

    let keys: Vec<_> = records
        .iter()
        .map(|r| (r.date, r.instrument.as_str()))
        .collect();
    assert_eq!(keys, vec![(date(1), "B"), (date(2), "A"), (date(2), "B")]);
}

#[tokio::test]
async fn test_industry_labels_attached() {
    let source = InMemorySource::default()
        .with_caps("A", &[(1, 100.0)])
        .with_caps("B", &[(1, 200.0)]);
    let instruments = vec!["A".to_string(), "B".to_string()];
    let industries = HashMap::from([("A".to_string(), "银行".to_string())]);

    let records = collect_market_caps(
        &source,
        &instruments,
        range(),
        &config(),
        Some(&industries),
        None,
    )
    .await
    .unwrap();

    assert_eq!(records[0].industry.as_deref(), Some("银行"));
    assert_eq!(records[1].industry, None);
}

#[tokio::test]
async fn test_all_failed_is_an_error() {
    let source = InMemorySource::default().failing("A").failing("B");
    let instruments = vec!["A".to_string(), "B".to_string()];

    let result = collect_prices(&source, &instruments, range(), &config(), None).await;
    assert!(matches!(result, Err(DataError::MissingData { .. })));
}

#[tokio::test]
async fn test_empty_responses_contribute_nothing() {
    let source = InMemorySource::default().with_closes("A", &[(1, 10.0), (2, 11.0)]);
    let instruments = vec!["A".to_string(), "EMPTY".to_string()];

    let prices = collect_prices(&source, &instruments, range(), &config(), None)
        .await
        .unwrap();

    assert_eq!(prices.len(), 2);
    assert!(prices[0].future_return.is_some());
    assert!(prices[1].future_return.is_none());
}

#[tokio::test]
async fn test_duplicate_constituents_fetched_once() {
    let constituents = vec![
        ConstituentRecord::new(date(1), "A".to_string()),
        ConstituentRecord::new(date(2), "A".to_string()),
        ConstituentRecord::new(date(2), "B".to_string()),
    ];
    let instruments = unique_instruments(&constituents);
    let source = InMemorySource::default()
        .with_closes("A", &[(1, 10.0)])
        .with_closes("B", &[(1, 10.0)]);

    collect_prices(&source, &instruments, range(), &config(), None)
        .await
        .unwrap();

    assert_eq!(*source.calls.borrow(), vec!["A", "B"]);
}

#[tokio::test(start_paused = true)]
async fn test_delay_follows_successful_calls_only() {
    let source = InMemorySource::default()
        .with_closes("A", &[(1, 10.0), (2, 11.0)])
        .failing("B")
        .with_closes("C", &[(1, 20.0)])
        .failing("D");
    let instruments: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
    let config = FetchConfig {
        rate_limit_delay: Duration::from_millis(500),
        ..FetchConfig::default()
    };

    let started = tokio::time::Instant::now();
    collect_prices(&source, &instruments, range(), &config, None)
        .await
        .unwrap();

    // Two successful calls, two failures
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
    assert_eq!(source.calls.borrow().len(), 4);
}
