//! Tushare Pro API client.

use super::table::{ApiResponse, ApiTable, cell_f64, cell_str};
use crate::error::{DataError, Result};
use crate::records::{
    ConstituentRecord, DateRange, MarketCapRecord, PriceRecord, parse_date, to_compact,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Duration;

/// Tushare Pro API base URL
pub const TUSHARE_BASE_URL: &str = "http://api.tushare.pro";

/// Valuation field requested from `daily_basic` unless configured otherwise
pub const DEFAULT_CAP_FIELD: &str = "free_share";

/// Connection settings for [`TushareClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint all calls are posted to.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: TUSHARE_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Tushare Pro API client.
///
/// Every call is a JSON `POST` carrying the endpoint name, the token, the
/// query parameters and the requested fields.
pub struct TushareClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TushareClient {
    /// Create a client with default settings.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(token, ClientConfig::default())
    }

    /// Create a client with custom settings.
    ///
    /// # Example
    /// ```no_run
    /// use lncap_data::tushare::{ClientConfig, TushareClient};
    /// use std::time::Duration;
    ///
    /// # fn example() -> lncap_data::Result<()> {
    /// let config = ClientConfig {
    ///     timeout: Duration::from_secs(10),
    ///     ..ClientConfig::default()
    /// };
    /// let client = TushareClient::with_config("my-token", config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(token: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(DataError::MissingToken);
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            token,
            base_url: config.base_url,
        })
    }

    /// Call an endpoint and return its table.
    ///
    /// An empty or `null` payload yields an empty table.
    pub async fn query(&self, api_name: &str, params: Value, fields: &[&str]) -> Result<ApiTable> {
        let body = json!({
            "api_name": api_name,
            "token": self.token,
            "params": params,
            "fields": fields.join(","),
        });

        let response = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "{} returned HTTP {}",
                api_name,
                response.status()
            )));
        }

        let envelope: ApiResponse = response.json().await.map_err(DataError::Network)?;
        unwrap_envelope(envelope)
    }

    /// Index membership between `range.start()` and `range.end()`.
    pub async fn index_constituents(
        &self,
        index_code: &str,
        range: DateRange,
    ) -> Result<Vec<ConstituentRecord>> {
        validate_symbol(index_code)?;
        let table = self
            .query(
                "index_weight",
                json!({
                    "index_code": index_code,
                    "start_date": to_compact(range.start()),
                    "end_date": to_compact(range.end()),
                }),
                &["trade_date", "con_code"],
            )
            .await?;
        parse_constituents(&table, range)
    }

    /// Daily floating market cap for one stock, read from `cap_field`.
    pub async fn daily_market_cap(
        &self,
        ts_code: &str,
        range: DateRange,
        cap_field: &str,
    ) -> Result<Vec<MarketCapRecord>> {
        validate_symbol(ts_code)?;
        let table = self
            .query(
                "daily_basic",
                json!({
                    "ts_code": ts_code,
                    "start_date": to_compact(range.start()),
                    "end_date": to_compact(range.end()),
                }),
                &["trade_date", "ts_code", cap_field],
            )
            .await?;
        parse_market_caps(&table, cap_field)
    }

    /// Daily close prices for one stock. Forward returns are left empty.
    pub async fn daily_close(&self, ts_code: &str, range: DateRange) -> Result<Vec<PriceRecord>> {
        validate_symbol(ts_code)?;
        let table = self
            .query(
                "daily",
                json!({
                    "ts_code": ts_code,
                    "start_date": to_compact(range.start()),
                    "end_date": to_compact(range.end()),
                }),
                &["trade_date", "ts_code", "close"],
            )
            .await?;
        parse_closes(&table)
    }

    /// Industry label of every listed stock.
    pub async fn stock_industries(&self) -> Result<HashMap<String, String>> {
        let table = self
            .query(
                "stock_basic",
                json!({ "list_status": "L" }),
                &["ts_code", "industry"],
            )
            .await?;
        parse_industries(&table)
    }
}

impl std::fmt::Debug for TushareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TushareClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.trim().is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(())
}

fn unwrap_envelope(envelope: ApiResponse) -> Result<ApiTable> {
    if envelope.code != 0 {
        return Err(DataError::TushareApi {
            code: envelope.code,
            msg: envelope.msg.unwrap_or_default(),
        });
    }
    Ok(envelope.data.unwrap_or_default())
}

fn required_str<'a>(row: &'a [Value], idx: usize, api_name: &str, field: &str) -> Result<&'a str> {
    cell_str(row, idx).ok_or_else(|| {
        DataError::Parse(format!("{}: null or non-string '{}' cell", api_name, field))
    })
}

pub(crate) fn parse_constituents(
    table: &ApiTable,
    range: DateRange,
) -> Result<Vec<ConstituentRecord>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let date_idx = table.column_index("index_weight", "trade_date")?;
    let code_idx = table.column_index("index_weight", "con_code")?;

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        let date = parse_date(required_str(row, date_idx, "index_weight", "trade_date")?)?;
        if !range.contains(date) {
            continue;
        }
        let code = required_str(row, code_idx, "index_weight", "con_code")?;
        records.push(ConstituentRecord::new(date, code.to_string()));
    }
    Ok(records)
}

pub(crate) fn parse_market_caps(table: &ApiTable, cap_field: &str) -> Result<Vec<MarketCapRecord>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let date_idx = table.column_index("daily_basic", "trade_date")?;
    let code_idx = table.column_index("daily_basic", "ts_code")?;
    let cap_idx = table.column_index("daily_basic", cap_field)?;

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        // Suspended days come back with null valuation fields
        let Some(cap) = cell_f64(row, cap_idx) else {
            continue;
        };
        let date = parse_date(required_str(row, date_idx, "daily_basic", "trade_date")?)?;
        let code = required_str(row, code_idx, "daily_basic", "ts_code")?;
        records.push(MarketCapRecord::new(date, code.to_string(), cap));
    }
    Ok(records)
}

pub(crate) fn parse_closes(table: &ApiTable) -> Result<Vec<PriceRecord>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }
    let date_idx = table.column_index("daily", "trade_date")?;
    let code_idx = table.column_index("daily", "ts_code")?;
    let close_idx = table.column_index("daily", "close")?;

    let mut records = Vec::with_capacity(table.len());
    for row in table.rows() {
        let Some(close) = cell_f64(row, close_idx) else {
            continue;
        };
        let date = parse_date(required_str(row, date_idx, "daily", "trade_date")?)?;
        let code = required_str(row, code_idx, "daily", "ts_code")?;
        records.push(PriceRecord::new(date, code.to_string(), close));
    }
    Ok(records)
}

pub(crate) fn parse_industries(table: &ApiTable) -> Result<HashMap<String, String>> {
    if table.is_empty() {
        return Ok(HashMap::new());
    }
    let code_idx = table.column_index("stock_basic", "ts_code")?;
    let industry_idx = table.column_index("stock_basic", "industry")?;

    Ok(table
        .rows()
        .filter_map(|row| {
            let code = cell_str(row, code_idx)?;
            let industry = cell_str(row, industry_idx)?;
            Some((code.to_string(), industry.to_string()))
        })
        .collect())
}
