// =============================================================================
// Moving Average Convergence / Divergence (MACD)
// =============================================================================
//
// MACD line  = EMA(fast) - EMA(slow)
// Signal     = EMA(signal_period) of the MACD line
// Histogram  = MACD line - Signal
//
// With the standard 12/26/9 periods the MACD line becomes available at index
// slow - 1 = 25 and the signal at index slow + signal_period - 2 = 33. All
// three series stay aligned to the input closes.

use crate::indicators::ema::calculate_ema;

/// The MACD triple, each series the same length as the input closes.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

/// Compute the aligned MACD triple.
///
/// Degenerate parameters (any period zero, or `fast >= slow`) yield all-None
/// series of input length.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let len = closes.len();
    let mut macd = vec![None; len];
    let mut signal = vec![None; len];
    let mut histogram = vec![None; len];

    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return MacdSeries { macd, signal, histogram };
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    for i in 0..len {
        if let (Some(f), Some(s)) = (ema_fast[i], ema_slow[i]) {
            macd[i] = Some(f - s);
        }
    }

    // Signal line: EMA over the defined (contiguous) part of the MACD line,
    // placed back at the same offset to preserve alignment.
    if let Some(offset) = macd.iter().position(Option::is_some) {
        let values: Vec<f64> = macd[offset..]
            .iter()
            .take_while(|v| v.is_some())
            .map(|v| v.unwrap_or_default())
            .collect();

        for (j, v) in calculate_ema(&values, signal_period).into_iter().enumerate() {
            signal[offset + j] = v;
        }
    }

    for i in 0..len {
        if let (Some(m), Some(s)) = (macd[i], signal[i]) {
            histogram[i] = Some(m - s);
        }
    }

    MacdSeries { macd, signal, histogram }
}
