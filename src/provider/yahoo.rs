// =============================================================================
// Yahoo Finance chart API client
// =============================================================================
//
// Talks to the public v8 chart endpoint:
//   GET /v8/finance/chart/{symbol}?range={range}&interval={interval}
//
// The response nests OHLCV data as parallel arrays under
// chart.result[0].indicators.quote[0]; individual entries may be JSON null,
// which is why all parsing goes through `opt_f64` instead of failing hard.
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use crate::provider::{ProviderError, QuoteSource};
use crate::types::{HistoricalBar, Quote};

/// Yahoo rejects requests without a browser-ish user agent.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; tickerdeck/1.0)";

/// Client for the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
}

impl YahooClient {
    /// Create a client against the public Yahoo endpoint with a 10 s timeout.
    pub fn new() -> Self {
        Self::with_base_url("https://query1.finance.yahoo.com")
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut default_headers = HeaderMap::new();
        if let Ok(val) = HeaderValue::from_str(DEFAULT_USER_AGENT) {
            default_headers.insert(USER_AGENT, val);
        }

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Issue a chart request and return the `chart.result[0]` object.
    async fn fetch_chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<serde_json::Value, ProviderError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, symbol, range, interval
        );

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(symbol.to_string()));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::Parse(format!("chart response is not JSON: {e}")))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body["chart"]["error"]["description"]
                    .as_str()
                    .unwrap_or("unknown provider error")
                    .to_string(),
            });
        }

        // A 200 with chart.error set still means "no data".
        if !body["chart"]["error"].is_null() {
            return Err(ProviderError::NotFound(symbol.to_string()));
        }

        body["chart"]["result"]
            .as_array()
            .and_then(|arr| arr.first().cloned())
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }

    /// Parse the parallel arrays of a chart result into ascending bars.
    ///
    /// Bars whose close is null are dropped so that every retained bar carries
    /// a close price; the remaining fields stay nullable.
    fn parse_bars(result: &serde_json::Value) -> Result<Vec<HistoricalBar>, ProviderError> {
        let timestamps = result["timestamp"]
            .as_array()
            .ok_or_else(|| ProviderError::Parse("missing timestamp array".into()))?;

        let quote = result["indicators"]["quote"]
            .as_array()
            .and_then(|arr| arr.first())
            .ok_or_else(|| ProviderError::Parse("missing indicators.quote[0]".into()))?;

        let opens = quote["open"].as_array();
        let highs = quote["high"].as_array();
        let lows = quote["low"].as_array();
        let closes = quote["close"]
            .as_array()
            .ok_or_else(|| ProviderError::Parse("missing close array".into()))?;
        let volumes = quote["volume"].as_array();

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, ts) in timestamps.iter().enumerate() {
            let Some(secs) = ts.as_i64() else {
                warn!(index = i, "skipping bar with non-numeric timestamp");
                continue;
            };
            let Some(date) = chrono::DateTime::from_timestamp(secs, 0) else {
                warn!(index = i, secs, "skipping bar with out-of-range timestamp");
                continue;
            };

            // Null close => the bar is unusable for indicator math.
            let Some(close) = closes.get(i).and_then(opt_f64) else {
                continue;
            };

            bars.push(HistoricalBar {
                date,
                open: opens.and_then(|a| a.get(i)).and_then(opt_f64),
                high: highs.and_then(|a| a.get(i)).and_then(opt_f64),
                low: lows.and_then(|a| a.get(i)).and_then(opt_f64),
                close,
                volume: volumes.and_then(|a| a.get(i)).and_then(opt_f64),
            });
        }

        Ok(bars)
    }
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_quote")]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
        let result = self.fetch_chart(symbol, "1d", "1d").await?;

        let previous_close = result["meta"]["chartPreviousClose"].as_f64();
        let bars = Self::parse_bars(&result)?;

        let last = bars
            .last()
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))?;

        debug!(symbol, close = last.close, "quote fetched");

        Ok(Quote {
            symbol: symbol.to_string(),
            open: last.open,
            high: last.high,
            low: last.low,
            close: Some(last.close),
            volume: last.volume,
            previous_close,
            timestamp: Some(last.date.timestamp()),
        })
    }

    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<HistoricalBar>, ProviderError> {
        let result = self.fetch_chart(symbol, range, interval).await?;
        let bars = Self::parse_bars(&result)?;

        if bars.is_empty() {
            return Err(ProviderError::NotFound(symbol.to_string()));
        }

        debug!(symbol, range, interval, count = bars.len(), "history fetched");
        Ok(bars)
    }
}

/// Read a JSON value as f64, treating null and non-numbers as absent.
fn opt_f64(val: &serde_json::Value) -> Option<f64> {
    val.as_f64().filter(|v| v.is_finite())
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> serde_json::Value {
        serde_json::json!({
            "meta": { "chartPreviousClose": 99.5 },
            "timestamp": [1_700_000_000, 1_700_086_400, 1_700_172_800],
            "indicators": {
                "quote": [{
                    "open":   [100.0, 101.0, null],
                    "high":   [102.0, 103.0, 104.0],
                    "low":    [99.0, 100.0, 101.0],
                    "close":  [101.0, null, 103.0],
                    "volume": [1000.0, 2000.0, null]
                }]
            }
        })
    }

    #[test]
    fn parse_bars_drops_null_close_entries() {
        let bars = YahooClient::parse_bars(&sample_result()).unwrap();
        // Middle bar has a null close and must be dropped.
        assert_eq!(bars.len(), 2);
        assert!((bars[0].close - 101.0).abs() < f64::EPSILON);
        assert!((bars[1].close - 103.0).abs() < f64::EPSILON);
        // Dates stay ascending.
        assert!(bars[0].date < bars[1].date);
    }

    #[test]
    fn parse_bars_keeps_nullable_side_fields() {
        let bars = YahooClient::parse_bars(&sample_result()).unwrap();
        // Third source bar survives (close present) with open/volume null.
        assert!(bars[1].open.is_none());
        assert!(bars[1].volume.is_none());
        assert_eq!(bars[1].high, Some(104.0));
    }

    #[test]
    fn parse_bars_missing_close_array_is_error() {
        let broken = serde_json::json!({
            "timestamp": [1_700_000_000],
            "indicators": { "quote": [{ "open": [1.0] }] }
        });
        assert!(matches!(
            YahooClient::parse_bars(&broken),
            Err(ProviderError::Parse(_))
        ));
    }

    #[test]
    fn opt_f64_filters_null_and_nan() {
        assert_eq!(opt_f64(&serde_json::json!(1.5)), Some(1.5));
        assert_eq!(opt_f64(&serde_json::Value::Null), None);
        assert_eq!(opt_f64(&serde_json::json!("12")), None);
    }
}
