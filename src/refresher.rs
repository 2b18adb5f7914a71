// =============================================================================
// Cache Refresher -- background snapshot polling loop
// =============================================================================
//
// Two states: idle between ticks, refreshing while a cycle runs. A cycle
// fans out one quote fetch per configured symbol, builds the complete next
// board off to the side and publishes it in a single swap. A failed symbol
// keeps its previous cycle's values (marked stale) instead of aborting the
// cycle. If a cycle overruns the interval the next tick fires immediately
// after it finishes; cycles are never pre-empted.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app_state::{AppState, QuoteBoard};
use crate::fanout;
use crate::types::QuoteRow;

/// Run the refresh loop until `shutdown` flips to true.
///
/// Started once by `main`; the process owns exactly one refresher, which is
/// what makes the single-writer locking discipline on the board sound.
pub async fn run(state: Arc<AppState>, mut shutdown: watch::Receiver<bool>) {
    let poll_secs = state.runtime_config.read().poll_interval_secs.max(1);
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(poll_secs));

    info!(poll_secs, "cache refresher started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                refresh_cycle(&state).await;
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("cache refresher stopping");
                    return;
                }
            }
        }
    }
}

/// Execute one full refresh cycle and publish the resulting board.
pub async fn refresh_cycle(state: &AppState) {
    let (symbols, names, max_inflight) = {
        let config = state.runtime_config.read();
        (
            config.symbols.clone(),
            config.company_names.clone(),
            config.max_inflight_fetches,
        )
    };

    let started = std::time::Instant::now();
    let fresh = fanout::fetch_quote_rows(state.provider.as_ref(), &symbols, max_inflight).await;

    let previous = state.quote_board();
    let mut rows = merge_with_previous(previous.as_deref(), fresh);
    for row in &mut rows {
        row.name = names.get(&row.ticker).cloned();
    }

    let failed = rows.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        warn!(failed, total = rows.len(), "refresh cycle completed with failures");
    } else {
        debug!(total = rows.len(), elapsed_ms = started.elapsed().as_millis() as u64, "refresh cycle completed");
    }

    state.publish_board(QuoteBoard::new(rows, Utc::now()));
}

/// Per-symbol failure isolation: a row whose fetch failed this cycle carries
/// forward the previous cycle's values for that ticker (when any exist),
/// keeping the new error string and a stale marker.
fn merge_with_previous(previous: Option<&QuoteBoard>, fresh: Vec<QuoteRow>) -> Vec<QuoteRow> {
    fresh
        .into_iter()
        .map(|row| {
            if row.error.is_none() {
                return row;
            }
            match previous.and_then(|b| b.get(&row.ticker)) {
                Some(old) if old.has_data() => QuoteRow {
                    error: row.error,
                    stale: true,
                    ..old.clone()
                },
                _ => row,
            }
        })
        .collect()
}
