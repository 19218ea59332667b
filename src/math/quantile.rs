//! Empirical percentiles.
//!
//! Linear interpolation between order statistics (Hyndman & Fan type 7, the
//! default in R and NumPy): for sorted `x` of length `n` and probability `p`,
//!
//! ```text
//! h = (n - 1) p,   q = x[⌊h⌋] + (h - ⌊h⌋) (x[⌊h⌋ + 1] - x[⌊h⌋])
//! ```

/// Percentile of already sorted, finite values. `None` for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    Some(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

/// Percentile of unsorted values; non-finite values are ignored.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type7_percentiles_on_1_to_100() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        // h = 99p: 2.475 -> 3.475, 49.5 -> 50.5, 96.525 -> 97.525
        assert!((percentile(&values, 0.025).unwrap() - 3.475).abs() < 1e-12);
        assert!((percentile(&values, 0.5).unwrap() - 50.5).abs() < 1e-12);
        assert!((percentile(&values, 0.975).unwrap() - 97.525).abs() < 1e-12);
    }

    #[test]
    fn endpoints_and_single_value() {
        let values = [5.0, 1.0, 3.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 1.0), Some(5.0));
        assert_eq!(percentile(&[2.0], 0.975), Some(2.0));
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[f64::NAN], 0.5), None);
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(1.234, 2), 1.23);
        assert_eq!(round_to(-1.236, 2), -1.24);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
