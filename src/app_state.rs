// =============================================================================
// Central Application State -- tickerdeck facade
// =============================================================================
//
// The single shared mutable resource is the quote board: the cache refresher
// is its only writer, HTTP handlers are its readers. The board is replaced
// wholesale behind an RwLock<Option<Arc<...>>> -- the refresher builds the
// complete next table off to the side and swaps the Arc in one write, so a
// reader always sees a table from exactly one cycle.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::provider::QuoteSource;
use crate::runtime_config::RuntimeConfig;
use crate::types::QuoteRow;

/// One complete refresh cycle's output: a row per configured symbol in
/// declaration order, plus the table-wide refresh timestamp.
#[derive(Debug, Clone)]
pub struct QuoteBoard {
    rows: Vec<QuoteRow>,
    by_ticker: HashMap<String, usize>,
    pub last_update: DateTime<Utc>,
}

impl QuoteBoard {
    pub fn new(rows: Vec<QuoteRow>, last_update: DateTime<Utc>) -> Self {
        let by_ticker = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.ticker.clone(), i))
            .collect();
        Self {
            rows,
            by_ticker,
            last_update,
        }
    }

    /// Rows in configured symbol order.
    pub fn rows(&self) -> &[QuoteRow] {
        &self.rows
    }

    pub fn get(&self, ticker: &str) -> Option<&QuoteRow> {
        self.by_ticker.get(ticker).map(|&i| &self.rows[i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Shared state injected into the refresher task and every request handler.
pub struct AppState {
    pub runtime_config: RwLock<RuntimeConfig>,

    /// Latest snapshot table. `None` until the first refresh cycle completes.
    /// Single writer (the refresher); readers clone the Arc.
    quote_board: RwLock<Option<Arc<QuoteBoard>>>,

    /// Market-data provider shared by the refresher and the live endpoints.
    pub provider: Arc<dyn QuoteSource>,

    /// Process start, for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, provider: Arc<dyn QuoteSource>) -> Self {
        Self {
            runtime_config: RwLock::new(config),
            quote_board: RwLock::new(None),
            provider,
            start_time: std::time::Instant::now(),
        }
    }

    /// Current snapshot table, if at least one refresh cycle has completed.
    pub fn quote_board(&self) -> Option<Arc<QuoteBoard>> {
        self.quote_board.read().clone()
    }

    /// Replace the snapshot table atomically from the readers' perspective.
    pub fn publish_board(&self, board: QuoteBoard) {
        *self.quote_board.write() = Some(Arc::new(board));
    }
}
