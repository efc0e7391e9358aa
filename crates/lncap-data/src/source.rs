//! Data source abstraction used by the acquisition loop.

use crate::error::Result;
use crate::records::{ConstituentRecord, DateRange, MarketCapRecord, PriceRecord};
use crate::tushare::TushareClient;
use std::collections::HashMap;

/// Provider of index membership, valuation and price series.
///
/// Implementations are queried one instrument at a time.
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    /// Index membership records within `range`.
    async fn constituents(
        &self,
        index_code: &str,
        range: DateRange,
    ) -> Result<Vec<ConstituentRecord>>;

    /// Floating market cap series for one instrument.
    async fn market_caps(
        &self,
        instrument: &str,
        range: DateRange,
        cap_field: &str,
    ) -> Result<Vec<MarketCapRecord>>;

    /// Close price series for one instrument, without forward returns.
    async fn closes(&self, instrument: &str, range: DateRange) -> Result<Vec<PriceRecord>>;

    /// Industry label per instrument.
    async fn industries(&self) -> Result<HashMap<String, String>>;
}

impl MarketDataSource for TushareClient {
    async fn constituents(
        &self,
        index_code: &str,
        range: DateRange,
    ) -> Result<Vec<ConstituentRecord>> {
        self.index_constituents(index_code, range).await
    }

    async fn market_caps(
        &self,
        instrument: &str,
        range: DateRange,
        cap_field: &str,
    ) -> Result<Vec<MarketCapRecord>> {
        self.daily_market_cap(instrument, range, cap_field).await
    }

    async fn closes(&self, instrument: &str, range: DateRange) -> Result<Vec<PriceRecord>> {
        self.daily_close(instrument, range).await
    }

    async fn industries(&self) -> Result<HashMap<String, String>> {
        self.stock_industries().await
    }
}
