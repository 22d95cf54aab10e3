//! Read-only derived values shown next to each row.

use crate::domain::entities::Row;
use crate::domain::error::{DomainError, DomainResult};

/// Override if present, else base value.
pub fn effective_value(row: &Row) -> f64 {
    row.effective_value()
}

/// Relative change of the effective value against the base value, in percent.
pub fn variance(row: &Row) -> DomainResult<f64> {
    if row.base_value == 0.0 {
        return Err(DomainError::DivisionByZero(row.id.clone()));
    }
    let v = (effective_value(row) - row.base_value) / row.base_value * 100.0;
    // No change over a negative base yields -0.0
    Ok(if v == 0.0 { 0.0 } else { v })
}

/// Variance formatted with two decimals and a trailing `%`, e.g. `"-20.00%"`.
pub fn variance_percent(row: &Row) -> DomainResult<String> {
    variance(row).map(|v| format!("{v:.2}%"))
}

/// Like [`variance_percent`], rendering `sentinel` for rows with a zero base value.
pub fn variance_or(row: &Row, sentinel: &str) -> String {
    variance_percent(row).unwrap_or_else(|_| sentinel.to_string())
}
