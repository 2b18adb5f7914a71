// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Cumulative volume-direction indicator: volume is added on up-days,
// subtracted on down-days and ignored on flat days. Seeded with the first
// bar's volume, so there is no warm-up region -- the series is defined at
// every index.

/// Compute the aligned OBV series for parallel `closes` / `volumes` slices.
///
/// Returns an all-None series when the slices differ in length (malformed
/// input); otherwise every entry is `Some`.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<Option<f64>> {
    if closes.len() != volumes.len() {
        return vec![None; closes.len()];
    }
    if closes.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(closes.len());
    let mut obv = volumes[0];
    out.push(Some(obv));

    for i in 1..closes.len() {
        if closes[i] > closes[i - 1] {
            obv += volumes[i];
        } else if closes[i] < closes[i - 1] {
            obv -= volumes[i];
        }
        out.push(Some(obv));
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
    fn obv_empty_input() {
        assert!(calculate_obv(&[], &[]).is_empty());
    }

    #[test]
    fn obv_mismatched_lengths_is_all_none() {
        let out = calculate_obv(&[1.0, 2.0], &[10.0]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(Option::is_none));
    }

    #[test]
    fn obv_seeded_with_first_volume() {
        let out = calculate_obv(&[100.0], &[500.0]);
        assert_eq!(out, vec![Some(500.0)]);
    }

    #[test]
    fn obv_adds_on_up_days_subtracts_on_down_days() {
        let closes = vec![10.0, 11.0, 10.5, 10.5, 12.0];
        let volumes = vec![100.0, 50.0, 30.0, 40.0, 20.0];
        let out = calculate_obv(&closes, &volumes);

        // 100, +50 (up), -30 (down), flat (ignored), +20 (up).
        assert_eq!(
            out,
            vec![Some(100.0), Some(150.0), Some(120.0), Some(120.0), Some(140.0)]
        );
    }

    #[test]
    fn obv_length_matches_input() {
        let closes: Vec<f64> = (1..=50).map(|x| x as f64).collect();
        let volumes = vec![10.0; 50];
        let out = calculate_obv(&closes, &volumes);
        assert_eq!(out.len(), 50);
        assert!(out.iter().all(Option::is_some));
    }
}
