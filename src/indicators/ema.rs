// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = close_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The first EMA value is seeded with the SMA of the first `period` closes and
// lands at index `period - 1`; earlier entries are None so the series stays
// aligned to the input.
// =============================================================================

/// Compute the aligned EMA series for `closes` and `period`.
///
/// Same length as the input, `None` before index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => all-None series (division by zero guard)
/// - `closes.len() < period` => all-None series
/// - A non-finite intermediate value stops the series; remaining entries stay None.
pub fn calculate_ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma: f64 = closes[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return out;
    }

    out[period - 1] = Some(sma);
    let mut prev_ema = sma;

    for i in period..closes.len() {
        let ema = closes[i] * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            // Downstream consumers should not trust a broken series.
            break;
        }
        out[i] = Some(ema);
        prev_ema = ema;
    }

    out
}
