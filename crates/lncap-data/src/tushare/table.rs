//! Column-oriented tables returned by the Tushare API.
//!
//! Every endpoint answers with `{"fields": [...], "items": [[...], ...]}`,
//! where each item is a row aligned with `fields`.

use crate::error::{DataError, Result};
use serde::Deserialize;
use serde_json::Value;

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse {
    /// Zero on success.
    pub(crate) code: i64,
    /// Error message, empty on success.
    #[serde(default)]
    pub(crate) msg: Option<String>,
    /// Payload, `null` on error.
    #[serde(default)]
    pub(crate) data: Option<ApiTable>,
}

/// A table of rows as returned by one API call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiTable {
    /// Column names.
    pub fields: Vec<String>,
    /// Rows, each aligned with `fields`.
    #[serde(default)]
    pub items: Vec<Vec<Value>>,
}

impl ApiTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of `field` among the columns.
    pub fn column_index(&self, api_name: &str, field: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f == field)
            .ok_or_else(|| DataError::MissingField {
                api_name: api_name.to_string(),
                field: field.to_string(),
            })
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.items.iter().map(Vec::as_slice)
    }
}

/// Read a cell as a string, `None` for null or missing cells.
pub fn cell_str(row: &[Value], idx: usize) -> Option<&str> {
    row.get(idx).and_then(Value::as_str)
}

/// Read a cell as a float, `None` for null, missing or non-finite cells.
///
/// Numeric strings are accepted as well.
pub fn cell_f64(row: &[Value], idx: usize) -> Option<f64> {
    let value = match row.get(idx)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}
