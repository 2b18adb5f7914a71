// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator implementations. Every series returned is
// exactly the length of the input price series, with `None` entries wherever
// the trailing window has not filled yet (warm-up), so that index i of every
// indicator corresponds to bar i of the source data.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;

use serde::Serialize;

/// Standard indicator parameters served by the stock-detail endpoint.
pub const SMA_SHORT: usize = 20;
pub const SMA_MEDIUM: usize = 50;
pub const SMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

/// The full indicator set computed over one historical series. Every vector
/// has the same length as the input closes.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSet {
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
    pub sma200: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub macd_hist: Vec<Option<f64>>,
    pub bb_upper: Vec<Option<f64>>,
    pub bb_middle: Vec<Option<f64>>,
    pub bb_lower: Vec<Option<f64>>,
    pub obv: Vec<Option<f64>>,
}

/// Compute the standard indicator set over parallel closes / volumes.
pub fn compute_indicator_set(closes: &[f64], volumes: &[f64]) -> IndicatorSet {
    let macd = macd::calculate_macd(closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let bands = bollinger::calculate_bollinger(closes, BOLLINGER_PERIOD, BOLLINGER_STD);

    IndicatorSet {
        sma20: sma::calculate_sma(closes, SMA_SHORT),
        sma50: sma::calculate_sma(closes, SMA_MEDIUM),
        sma200: sma::calculate_sma(closes, SMA_LONG),
        rsi: rsi::calculate_rsi(closes, RSI_PERIOD),
        macd: macd.macd,
        macd_signal: macd.signal,
        macd_hist: macd.histogram,
        bb_upper: bands.upper,
        bb_middle: bands.middle,
        bb_lower: bands.lower,
        obv: obv::calculate_obv(closes, volumes),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_set_series_all_match_input_length() {
        let closes: Vec<f64> = (1..=250).map(|x| x as f64).collect();
        let volumes = vec![1000.0; 250];

        let set = compute_indicator_set(&closes, &volumes);

        for (name, series) in [
            ("sma20", &set.sma20),
            ("sma50", &set.sma50),
            ("sma200", &set.sma200),
            ("rsi", &set.rsi),
            ("macd", &set.macd),
            ("macd_signal", &set.macd_signal),
            ("macd_hist", &set.macd_hist),
            ("bb_upper", &set.bb_upper),
            ("bb_middle", &set.bb_middle),
            ("bb_lower", &set.bb_lower),
            ("obv", &set.obv),
        ] {
            assert_eq!(series.len(), 250, "{name} length mismatch");
        }
    }

    #[test]
    fn indicator_set_warm_up_boundaries() {
        let closes: Vec<f64> = (1..=250).map(|x| x as f64).collect();
        let volumes = vec![1000.0; 250];

        let set = compute_indicator_set(&closes, &volumes);

        assert!(set.sma20[18].is_none() && set.sma20[19].is_some());
        assert!(set.sma50[48].is_none() && set.sma50[49].is_some());
        assert!(set.sma200[198].is_none() && set.sma200[199].is_some());
        assert!(set.rsi[13].is_none() && set.rsi[14].is_some());
        assert!(set.macd[24].is_none() && set.macd[25].is_some());
        assert!(set.macd_signal[32].is_none() && set.macd_signal[33].is_some());
        assert!(set.bb_middle[18].is_none() && set.bb_middle[19].is_some());
        assert!(set.obv[0].is_some());
    }

    #[test]
    fn indicator_set_short_series_stays_aligned() {
        // Shorter than every window except OBV: all warm-up, correct lengths.
        let closes = vec![10.0, 11.0, 12.0];
        let volumes = vec![1.0, 2.0, 3.0];

        let set = compute_indicator_set(&closes, &volumes);

        assert_eq!(set.sma200.len(), 3);
        assert!(set.sma200.iter().all(Option::is_none));
        assert!(set.rsi.iter().all(Option::is_none));
        assert!(set.obv.iter().all(Option::is_some));
    }
}
