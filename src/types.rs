// =============================================================================
// Shared types used across the tickerdeck facade
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live quote for a single instrument as returned by the provider.
///
/// Every numeric field is optional -- `None` means the provider had no data
/// for that field. A quote with all fields `None` is still a valid quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    /// Previous session close, used for the change-percent computation.
    pub previous_close: Option<f64>,
    /// Bar timestamp (unix seconds) as reported by the provider.
    pub timestamp: Option<i64>,
}

/// One row of the quote table served to the frontend.
///
/// A row is produced for every requested symbol whether or not the underlying
/// fetch succeeded; a failed fetch yields a row with null numeric fields and
/// an `error` description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRow {
    pub ticker: String,
    /// Company display name, when one is configured for the ticker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub change_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// True when the values were carried over from an earlier refresh cycle
    /// because the latest fetch for this symbol failed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl QuoteRow {
    /// Build a row from a successful provider quote.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            ticker: quote.symbol.clone(),
            name: None,
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            change_pct: change_percent(quote.close, quote.previous_close),
            error: None,
            stale: false,
        }
    }

    /// Build a null-valued row for a symbol whose fetch failed.
    pub fn failed(ticker: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            name: None,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            change_pct: None,
            error: Some(error.into()),
            stale: false,
        }
    }

    /// Whether the row carries any actual price data.
    pub fn has_data(&self) -> bool {
        self.close.is_some()
    }
}

/// Percentage change of `close` relative to `previous_close`.
///
/// Returns `None` when either value is missing, when `previous_close` is zero
/// (division guard), or when the result is non-finite. Never NaN.
pub fn change_percent(close: Option<f64>, previous_close: Option<f64>) -> Option<f64> {
    let close = close?;
    let prev = previous_close?;
    if prev == 0.0 {
        return None;
    }
    let pct = (close - prev) / prev * 100.0;
    pct.is_finite().then_some(pct)
}

/// A single OHLCV bar of a historical series.
///
/// Bars are guaranteed to carry a close (the provider layer drops bars with a
/// null close); the remaining fields stay optional. Serialised field names
/// match the frontend's expected `Date`/`Open`/... shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HistoricalBar {
    pub date: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}
