// =============================================================================
// Runtime Configuration -- JSON-backed settings with atomic save
// =============================================================================
//
// Every tunable of the facade lives here: the tracked symbol universe, the
// watchlist, the refresh cadence, and the fan-out concurrency bound.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    [
        "RELIANCE.NS",
        "TCS.NS",
        "HDFCBANK.NS",
        "INFY.NS",
        "ICICIBANK.NS",
        "HINDUNILVR.NS",
        "BHARTIARTL.NS",
        "KOTAKBANK.NS",
        "ITC.NS",
        "WIPRO.NS",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_company_names() -> HashMap<String, String> {
    [
        ("RELIANCE.NS", "Reliance Industries"),
        ("TCS.NS", "Tata Consultancy Services"),
        ("HDFCBANK.NS", "HDFC Bank"),
        ("INFY.NS", "Infosys"),
        ("ICICIBANK.NS", "ICICI Bank"),
        ("HINDUNILVR.NS", "Hindustan Unilever"),
        ("BHARTIARTL.NS", "Bharti Airtel"),
        ("KOTAKBANK.NS", "Kotak Bank"),
        ("ITC.NS", "ITC"),
        ("WIPRO.NS", "Wipro"),
    ]
    .iter()
    .map(|(sym, name)| (sym.to_string(), name.to_string()))
    .collect()
}

fn default_watchlist() -> Vec<String> {
    ["AAPL", "GOOGL", "MSFT", "TSLA"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_inflight_fetches() -> usize {
    5
}

fn default_time_frame() -> String {
    "5y".to_string()
}

fn default_market_open_hour() -> u32 {
    9
}

fn default_market_close_hour() -> u32 {
    16
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration for the tickerdeck facade.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Symbols tracked by the cache refresher and served by /stocks.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Company display names keyed by ticker, served alongside quotes.
    #[serde(default = "default_company_names")]
    pub company_names: HashMap<String, String>,

    /// Symbols served live (fan-out per request) by /watchlist.
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,

    /// Seconds between snapshot refresh cycles.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum concurrent outbound provider calls during a fan-out.
    #[serde(default = "default_max_inflight_fetches")]
    pub max_inflight_fetches: usize,

    /// Provider range string used when a request carries no timeFrame.
    #[serde(default = "default_time_frame")]
    pub default_time_frame: String,

    /// Simplified market-hours window (local time, [open, close)).
    /// Not a real exchange calendar.
    #[serde(default = "default_market_open_hour")]
    pub market_open_hour: u32,

    #[serde(default = "default_market_close_hour")]
    pub market_close_hour: u32,

    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            company_names: default_company_names(),
            watchlist: default_watchlist(),
            poll_interval_secs: default_poll_interval_secs(),
            max_inflight_fetches: default_max_inflight_fetches(),
            default_time_frame: default_time_frame(),
            market_open_hour: default_market_open_hour(),
            market_close_hour: default_market_close_hour(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            poll_interval_secs = config.poll_interval_secs,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.symbols.len(), 10);
        assert_eq!(cfg.symbols[0], "RELIANCE.NS");
        assert_eq!(cfg.watchlist, vec!["AAPL", "GOOGL", "MSFT", "TSLA"]);
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.max_inflight_fetches, 5);
        assert_eq!(cfg.default_time_frame, "5y");
        assert_eq!(cfg.market_open_hour, 9);
        assert_eq!(cfg.market_close_hour, 16);
    }

    #[test]
    fn every_default_symbol_has_a_company_name() {
        let cfg = RuntimeConfig::default();
        for symbol in &cfg.symbols {
            assert!(
                cfg.company_names.contains_key(symbol),
                "missing company name for {symbol}"
            );
        }
        assert_eq!(
            cfg.company_names.get("RELIANCE.NS").map(String::as_str),
            Some("Reliance Industries")
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = std::env::temp_dir().join("tickerdeck_config_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let cfg = RuntimeConfig {
            poll_interval_secs: 42,
            symbols: vec!["AAPL".into()],
            ..RuntimeConfig::default()
        };
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded.poll_interval_secs, 42);
        assert_eq!(loaded.symbols, vec!["AAPL"]);
        assert_eq!(loaded.company_names, cfg.company_names);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.poll_interval_secs, 5);
        assert_eq!(cfg.symbols.len(), 10);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "symbols": ["AAPL"], "poll_interval_secs": 30 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbols, vec!["AAPL"]);
        assert_eq!(cfg.poll_interval_secs, 30);
        assert_eq!(cfg.max_inflight_fetches, 5);
        assert_eq!(cfg.watchlist.len(), 4);
    }

    #[test]
    fn roundtrip_serialisation() {
        let cfg = RuntimeConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.symbols, cfg2.symbols);
        assert_eq!(cfg.poll_interval_secs, cfg2.poll_interval_secs);
        assert_eq!(cfg.bind_addr, cfg2.bind_addr);
    }
}
