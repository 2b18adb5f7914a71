// =============================================================================
// Bounded-concurrency quote fan-out
// =============================================================================
//
// Issues one provider call per requested symbol with at most `max_inflight`
// in flight at once; excess requests queue on the semaphore. Results come
// back in input order (join_all preserves position regardless of completion
// order) and each symbol succeeds or fails independently -- a failure becomes
// a null-valued row, never an early return.

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::provider::QuoteSource;
use crate::types::QuoteRow;

/// Fetch one quote row per symbol, preserving input order.
///
/// A single attempt is made per symbol; callers wanting a retry re-invoke the
/// whole fan-out. A hang in one call occupies only its semaphore slot.
pub async fn fetch_quote_rows(
    provider: &dyn QuoteSource,
    symbols: &[String],
    max_inflight: usize,
) -> Vec<QuoteRow> {
    let semaphore = Semaphore::new(max_inflight.max(1));

    let fetches = symbols.iter().map(|symbol| {
        let semaphore = &semaphore;
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("semaphore is never closed");

            match provider.fetch_quote(symbol).await {
                Ok(quote) => QuoteRow::from_quote(&quote),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "quote fetch failed");
                    QuoteRow::failed(symbol.clone(), e.to_string())
                }
            }
        }
    });

    join_all(fetches).await
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::provider::ProviderError;
    use crate::types::{HistoricalBar, Quote};

    /// Fake provider: symbols containing "BAD" fail, symbols containing
    /// "SLOW" sleep first, everything else resolves immediately with a close
    /// equal to the symbol's length.
    struct FakeSource {
        in_flight: AtomicUsize,
        max_observed: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                max_observed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        async fn fetch_quote(&self, symbol: &str) -> Result<Quote, ProviderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_observed.fetch_max(now, Ordering::SeqCst);

            if symbol.contains("SLOW") {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if symbol.contains("BAD") {
                return Err(ProviderError::NotFound(symbol.to_string()));
            }

            Ok(Quote {
                symbol: symbol.to_string(),
                open: Some(1.0),
                high: Some(2.0),
                low: Some(0.5),
                close: Some(symbol.len() as f64),
                volume: Some(100.0),
                previous_close: Some(1.0),
                timestamp: Some(0),
            })
        }

        async fn fetch_history(
            &self,
            _symbol: &str,
            _range: &str,
            _interval: &str,
        ) -> Result<Vec<HistoricalBar>, ProviderError> {
            unimplemented!("not used by fan-out tests")
        }
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn returns_one_row_per_symbol_in_input_order() {
        let provider = FakeSource::new();
        let syms = symbols(&["AA", "BBB", "CCCC", "D"]);

        let rows = fetch_quote_rows(&provider, &syms, 2).await;

        assert_eq!(rows.len(), 4);
        for (row, sym) in rows.iter().zip(&syms) {
            assert_eq!(&row.ticker, sym);
            assert_eq!(row.close, Some(sym.len() as f64));
        }
    }

    #[tokio::test]
    async fn failing_symbol_yields_null_row_without_affecting_others() {
        let provider = FakeSource::new();
        let syms = symbols(&["A", "BAD.NS", "C"]);

        let rows = fetch_quote_rows(&provider, &syms, 5).await;

        assert_eq!(rows.len(), 3);
        assert!(rows[0].has_data());
        assert!(!rows[1].has_data());
        assert!(rows[1].error.as_deref().unwrap().contains("BAD.NS"));
        assert!(rows[2].has_data());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_failing_symbol_does_not_null_fast_ones() {
        let provider = FakeSource::new();
        let syms = symbols(&["F1", "SLOWBAD", "F2", "F3", "F4"]);

        let rows = fetch_quote_rows(&provider, &syms, 3).await;

        assert_eq!(rows.len(), 5);
        assert!(!rows[1].has_data());
        for i in [0usize, 2, 3, 4] {
            assert!(rows[i].has_data(), "row {i} should carry data");
            assert!(rows[i].error.is_none());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn concurrency_never_exceeds_bound() {
        let provider = FakeSource::new();
        let syms: Vec<String> = (0..10).map(|i| format!("SLOW{i}")).collect();

        let rows = fetch_quote_rows(&provider, &syms, 3).await;

        assert_eq!(rows.len(), 10);
        assert!(provider.max_observed.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn empty_symbol_list_returns_empty() {
        let provider = FakeSource::new();
        let rows = fetch_quote_rows(&provider, &[], 5).await;
        assert!(rows.is_empty());
    }
}
