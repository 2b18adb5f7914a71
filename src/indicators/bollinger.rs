// =============================================================================
// Bollinger Bands
// =============================================================================
//
// A volatility envelope around a simple moving average: the middle band is
// the SMA, the upper/lower bands sit `num_std` population standard deviations
// above/below it. All three series are aligned to the input closes with the
// usual `period - 1` warm-up.

/// The Bollinger band triple, each series the same length as the input.
#[derive(Debug, Clone)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate aligned Bollinger Bands for the given closing prices.
///
/// - `upper[i]`  = SMA + `num_std` * sigma over the window ending at i
/// - `middle[i]` = SMA
/// - `lower[i]`  = SMA - `num_std` * sigma
///
/// Entries before index `period - 1` are `None`; a non-finite window result
/// yields `None` for that index only.
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let len = closes.len();
    let mut upper = vec![None; len];
    let mut middle = vec![None; len];
    let mut lower = vec![None; len];

    if period == 0 || len < period {
        return BollingerSeries { upper, middle, lower };
    }

    for i in (period - 1)..len {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std_dev = variance.sqrt();

        let up = mean + num_std * std_dev;
        let lo = mean - num_std * std_dev;

        if mean.is_finite() && up.is_finite() && lo.is_finite() {
            middle[i] = Some(mean);
            upper[i] = Some(up);
            lower[i] = Some(lo);
        }
    }

    BollingerSeries { upper, middle, lower }
}
