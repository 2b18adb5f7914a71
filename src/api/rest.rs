// =============================================================================
// REST API Endpoints -- Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/` and are public (this facade fronts a
// read-only dashboard; there is no authentication by design).
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
//
// /stocks is served from the refresher's cached board, so its staleness is
// bounded by the poll interval. /watchlist is the live variant: a fresh
// bounded fan-out per request.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::fanout;
use crate::indicators::{self, IndicatorSet};
use crate::provider::ProviderError;
use crate::types::{HistoricalBar, QuoteRow};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stocks", get(stocks))
        .route("/api/v1/watchlist", get(watchlist))
        .route("/api/v1/historical/:ticker", get(historical))
        .route("/api/v1/stock/:ticker", get(stock_detail))
        .route("/api/v1/market-status", get(market_status))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

/// Handler-level error: always rendered as `{"error": ...}` with a proper
/// status code, never a raw 500 crash.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        let status = match e {
            ProviderError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(status = %self.status, error = %self.message, "request failed");
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
        server_time: Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Stocks (cached board)
// =============================================================================

#[derive(Serialize)]
struct StocksResponse {
    stocks: Vec<QuoteRow>,
    last_update: String,
}

async fn stocks(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let board = state
        .quote_board()
        .ok_or_else(|| ApiError::unavailable("first refresh cycle has not completed yet"))?;

    Ok(Json(StocksResponse {
        stocks: board.rows().to_vec(),
        last_update: board.last_update.to_rfc3339(),
    }))
}

// =============================================================================
// Watchlist (live fan-out per request)
// =============================================================================

async fn watchlist(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (symbols, names, max_inflight) = {
        let config = state.runtime_config.read();
        (
            config.watchlist.clone(),
            config.company_names.clone(),
            config.max_inflight_fetches,
        )
    };

    let mut rows =
        fanout::fetch_quote_rows(state.provider.as_ref(), &symbols, max_inflight).await;
    for row in &mut rows {
        row.name = names.get(&row.ticker).cloned();
    }
    Json(rows)
}

// =============================================================================
// Historical series
// =============================================================================

#[derive(Deserialize)]
struct TimeFrameQuery {
    #[serde(rename = "timeFrame")]
    time_frame: Option<String>,
}

/// Map a frontend timeFrame to a provider (range, interval) pair.
///
/// "1d" gets hourly bars for the day, "1mo" daily bars for the month; any
/// other value is passed through as a provider range with daily bars.
fn map_time_frame(time_frame: &str) -> (String, String) {
    match time_frame {
        "1d" => ("1d".to_string(), "1h".to_string()),
        "1mo" => ("1mo".to_string(), "1d".to_string()),
        other => (other.to_string(), "1d".to_string()),
    }
}

#[derive(Serialize)]
struct HistoricalResponse {
    ticker: String,
    data: Vec<HistoricalBar>,
}

async fn historical(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<TimeFrameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let time_frame = query
        .time_frame
        .unwrap_or_else(|| state.runtime_config.read().default_time_frame.clone());
    let (range, interval) = map_time_frame(&time_frame);

    let data = state
        .provider
        .fetch_history(&ticker, &range, &interval)
        .await?;

    Ok(Json(HistoricalResponse { ticker, data }))
}

// =============================================================================
// Stock detail (history + full indicator set + cached quote)
// =============================================================================

#[derive(Serialize)]
struct HistoricalArrays {
    dates: Vec<DateTime<Utc>>,
    prices: Vec<f64>,
    volumes: Vec<f64>,
}

#[derive(Serialize)]
struct StockDetailResponse {
    ticker: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<QuoteRow>,
    historical: HistoricalArrays,
    indicators: IndicatorSet,
}

async fn stock_detail(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<TimeFrameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let time_frame = query
        .time_frame
        .unwrap_or_else(|| state.runtime_config.read().default_time_frame.clone());
    let (range, interval) = map_time_frame(&time_frame);

    let bars = state
        .provider
        .fetch_history(&ticker, &range, &interval)
        .await?;

    let dates: Vec<DateTime<Utc>> = bars.iter().map(|b| b.date).collect();
    let prices: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume.unwrap_or(0.0)).collect();

    let indicators = indicators::compute_indicator_set(&prices, &volumes);

    let current = state
        .quote_board()
        .and_then(|board| board.get(&ticker).cloned());

    let name = state
        .runtime_config
        .read()
        .company_names
        .get(&ticker)
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(Json(StockDetailResponse {
        ticker,
        name,
        current,
        historical: HistoricalArrays {
            dates,
            prices,
            volumes,
        },
        indicators,
    }))
}

// =============================================================================
// Market status
// =============================================================================

/// Simplified local-hour market window check, not an exchange calendar.
fn is_market_open(hour: u32, open_hour: u32, close_hour: u32) -> bool {
    hour >= open_hour && hour < close_hour
}

#[derive(Serialize)]
struct MarketStatusResponse {
    is_open: bool,
    last_update: String,
    next_update: String,
}

async fn market_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (open_hour, close_hour, poll_secs) = {
        let config = state.runtime_config.read();
        (
            config.market_open_hour,
            config.market_close_hour,
            config.poll_interval_secs,
        )
    };

    let now = Local::now();
    let last_update = state
        .quote_board()
        .map(|b| b.last_update)
        .unwrap_or_else(Utc::now);
    let next_update = last_update + chrono::Duration::seconds(poll_secs as i64);

    Json(MarketStatusResponse {
        is_open: is_market_open(now.hour(), open_hour, close_hour),
        last_update: last_update.with_timezone(&Local).format("%I:%M:%S %p").to_string(),
        next_update: next_update.with_timezone(&Local).format("%I:%M:%S %p").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_frame_one_day_is_hourly() {
        assert_eq!(map_time_frame("1d"), ("1d".into(), "1h".into()));
    }

    #[test]
    fn time_frame_one_month_is_daily() {
        assert_eq!(map_time_frame("1mo"), ("1mo".into(), "1d".into()));
    }

    #[test]
    fn time_frame_passthrough_defaults_to_daily_bars() {
        assert_eq!(map_time_frame("5y"), ("5y".into(), "1d".into()));
        assert_eq!(map_time_frame("max"), ("max".into(), "1d".into()));
    }

    #[test]
    fn market_window_check() {
        assert!(!is_market_open(8, 9, 16));
        assert!(is_market_open(9, 9, 16));
        assert!(is_market_open(15, 9, 16));
        assert!(!is_market_open(16, 9, 16));
        assert!(!is_market_open(23, 9, 16));
    }
}
