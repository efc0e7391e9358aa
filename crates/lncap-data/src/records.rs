//! Flat `(date, instrument)` keyed records and date handling.
//!
//! The Tushare API speaks compact `YYYYMMDD` dates while the CSV files use
//! ISO-8601 `YYYY-MM-DD`. Readers accept either form.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compact date format used by the API.
pub const COMPACT_DATE_FORMAT: &str = "%Y%m%d";

/// ISO-8601 date format used in CSV files.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date in either compact (`20190430`) or ISO (`2019-04-30`) form.
///
/// A trailing time component (`2019-04-30 00:00:00`) is ignored.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(trimmed);

    let format = if day.contains('-') {
        ISO_DATE_FORMAT
    } else {
        COMPACT_DATE_FORMAT
    };

    NaiveDate::parse_from_str(day, format)
        .map_err(|e| DataError::Parse(format!("Invalid date '{}': {}", raw, e)))
}

/// Format a date in the compact API form.
pub fn to_compact(date: NaiveDate) -> String {
    date.format(COMPACT_DATE_FORMAT).to_string()
}

/// Serde adapter writing ISO dates and reading either form.
pub mod date_format {
    use super::{ISO_DATE_FORMAT, parse_date};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    /// Serialize as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(ISO_DATE_FORMAT).to_string())
    }

    /// Deserialize from `YYYY-MM-DD` or `YYYYMMDD`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(D::Error::custom)
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two dates in either supported form.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// First day of the range.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the range.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Membership of a stock in the index on a given date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstituentRecord {
    /// Observation date.
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    /// Instrument code, e.g. `600000.SH`.
    pub instrument: String,
}

impl ConstituentRecord {
    /// Create a new constituent record.
    pub const fn new(date: NaiveDate, instrument: String) -> Self {
        Self { date, instrument }
    }
}

/// Per-stock floating market capitalization on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCapRecord {
    /// Observation date.
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    /// Instrument code.
    pub instrument: String,
    /// Floating market capitalization.
    #[serde(alias = "market_cap_float")]
    pub mkt_cap_float: f64,
    /// Industry label, when known.
    #[serde(default)]
    pub industry: Option<String>,
}

impl MarketCapRecord {
    /// Create a new market cap record without an industry label.
    pub const fn new(date: NaiveDate, instrument: String, mkt_cap_float: f64) -> Self {
        Self {
            date,
            instrument,
            mkt_cap_float,
            industry: None,
        }
    }
}

/// Per-stock close price and the return realized over the following period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Observation date.
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    /// Instrument code.
    pub instrument: String,
    /// Close price on `date`.
    pub close_price: f64,
    /// `close[next] / close[date] - 1`, absent for the last date.
    #[serde(default)]
    pub future_return: Option<f64>,
}

impl PriceRecord {
    /// Create a new price record without a forward return.
    pub const fn new(date: NaiveDate, instrument: String, close_price: f64) -> Self {
        Self {
            date,
            instrument,
            close_price,
            future_return: None,
        }
    }
}
