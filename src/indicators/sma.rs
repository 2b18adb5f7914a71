// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean of the trailing `period` closes. The output is aligned to
// the input: index i of the result corresponds to close i, with the first
// `period - 1` entries None (warm-up).

/// Compute the aligned SMA series for `closes` and `period`.
///
/// The returned vector always has the same length as `closes`; entries before
/// index `period - 1` are `None`.
///
/// # Edge cases
/// - `period == 0` => all-None series
/// - `closes.len() < period` => all-None series
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let period_f = period as f64;
    let mut window_sum: f64 = closes[..period].iter().sum();
    out[period - 1] = Some(window_sum / period_f);

    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        out[i] = Some(window_sum / period_f);
    }

    out
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_empty_input() {
        assert!(calculate_sma(&[], 20).is_empty());
    }

    #[test]
    fn sma_period_zero_is_all_none() {
        let out = calculate_sma(&[1.0, 2.0, 3.0], 0);
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn sma_insufficient_data_is_all_none() {
        let out = calculate_sma(&[1.0, 2.0], 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn sma_warm_up_padding_and_length() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let out = calculate_sma(&closes, 4);

        assert_eq!(out.len(), closes.len());
        assert!(out[..3].iter().all(Option::is_none));
        assert!(out[3..].iter().all(Option::is_some));
    }

    #[test]
    fn sma_known_values() {
        let closes = vec![2.0, 4.0, 6.0, 8.0, 10.0];
        let out = calculate_sma(&closes, 3);
        assert_eq!(out, vec![None, None, Some(4.0), Some(6.0), Some(8.0)]);
    }

    #[test]
    fn sma_flat_series() {
        let out = calculate_sma(&[7.0; 30], 20);
        for v in out.iter().skip(19) {
            assert!((v.unwrap() - 7.0).abs() < 1e-10);
        }
    }
}
