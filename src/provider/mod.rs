// =============================================================================
// Market-data provider abstraction
// =============================================================================
//
// The facade only ever needs two capabilities from a provider: a live quote
// for a symbol and a historical OHLCV series for a symbol + range. Any
// provider exposing this shape is substitutable; the tests use in-memory
// fakes.

pub mod yahoo;

pub use yahoo::YahooClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{HistoricalBar, Quote};

/// Errors a provider call can surface.
///
/// These never cross the component boundary as panics: the fan-out fetcher
/// converts them into null-valued rows, the HTTP layer into JSON error
/// bodies.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("no data for symbol '{0}'")]
    NotFound(String),
}

/// The capability the core logic depends on.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest quote for `symbol`. Single attempt, no retry.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError>;

    /// Fetch a historical OHLCV series for `symbol`, ascending by date.
    ///
    /// `range` is a provider range string (e.g. "1d", "1mo", "5y") and
    /// `interval` a bar granularity (e.g. "1h", "1d").
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<HistoricalBar>, ProviderError>;
}
