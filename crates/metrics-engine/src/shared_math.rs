//! Pure mathematical helpers for the metrics engine.
//! Stateless functions over plain slices: no I/O, no shared state.

use metrics_core::MonthlyRecord;
use statrs::statistics::Statistics;

/// A non-decreasing value series needs more than this many points before
/// its drawdown is replaced by the growth-based estimate.
pub const SYNTHETIC_DRAWDOWN_MIN_POINTS: usize = 10;
const SYNTHETIC_DRAWDOWN_FLOOR: f64 = 5.0;
const SYNTHETIC_DRAWDOWN_CAP: f64 = 15.0;
const SYNTHETIC_DRAWDOWN_MULTIPLIER: f64 = 8.0;

/// Simple monthly returns: gain of month `i` over the cumulated investment
/// through month `i - 1`. Months whose prior cumulated investment is not
/// positive are skipped, not counted as zero.
pub fn monthly_returns(records: &[MonthlyRecord]) -> Vec<f64> {
    records
        .windows(2)
        .filter_map(|w| {
            let base = w[0].cumulated_investment;
            if base > 0.0 {
                Some(w[1].monthly_gain / base)
            } else {
                None
            }
        })
        .collect()
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or_zero(values.mean())
}

/// Population standard deviation (divides by N), 0 for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or_zero(values.population_std_dev())
}

/// Historical VaR: the return at index `floor((1 - confidence) * N)` of the
/// ascending-sorted series. Negative values are losses. 0 when the index
/// falls outside the series.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> f64 {
    let sorted = sorted_ascending(returns);
    let idx = tail_index(sorted.len(), confidence);
    sorted.get(idx).copied().unwrap_or(0.0)
}

/// Historical CVaR: mean of the sorted returns from the worst one through
/// the VaR index, inclusive.
pub fn conditional_value_at_risk(returns: &[f64], confidence: f64) -> f64 {
    let sorted = sorted_ascending(returns);
    let idx = tail_index(sorted.len(), confidence);
    if idx >= sorted.len() {
        return 0.0;
    }
    mean(&sorted[..=idx])
}

fn sorted_ascending(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted
}

fn tail_index(len: usize, confidence: f64) -> usize {
    // Negative products saturate to 0 on the cast
    ((1.0 - confidence) * len as f64).floor() as usize
}

/// Pearson correlation. 0 when lengths differ, the series are empty, or
/// either series has no variance.
pub fn correlation(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mean_a = mean(a);
    let mean_b = mean(b);

    let mut ss_ab = 0.0;
    let mut ss_aa = 0.0;
    let mut ss_bb = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        ss_ab += dx * dy;
        ss_aa += dx * dx;
        ss_bb += dy * dy;
    }

    if is_flat(a, ss_aa) || is_flat(b, ss_bb) {
        return 0.0;
    }
    finite_or_zero(ss_ab / (ss_aa * ss_bb).sqrt())
}

/// No variance beyond rounding noise, judged against the series' own magnitude.
fn is_flat(values: &[f64], sum_sq_dev: f64) -> bool {
    let sum_sq: f64 = values.iter().map(|v| v * v).sum();
    sum_sq_dev <= f64::EPSILON * sum_sq
}

/// Largest observed decline from a running peak, in percent.
/// Points where the running peak is not positive are ignored.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (peak - v) / peak * 100.0;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

pub fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[1] >= w[0])
}

/// Growth-based drawdown estimate for series that never decline.
///
/// Returns `None` unless the series is non-decreasing and has more than
/// [`SYNTHETIC_DRAWDOWN_MIN_POINTS`] points. The estimate is
/// `clamp(((last / first)^(1/n) - 1) * 100 * 8, 5, 15)`. Growth from a zero
/// start is unbounded and saturates at the cap; an undefined growth (0/0 or a
/// negative base) counts as zero.
pub fn estimate_synthetic_drawdown(values: &[f64]) -> Option<f64> {
    if values.len() <= SYNTHETIC_DRAWDOWN_MIN_POINTS || !is_non_decreasing(values) {
        return None;
    }
    let first = values[0];
    let last = values[values.len() - 1];
    let n = values.len() as f64;

    let growth = (last / first).powf(1.0 / n) - 1.0;
    let growth = if growth.is_nan() { 0.0 } else { growth };

    Some(
        (growth * 100.0 * SYNTHETIC_DRAWDOWN_MULTIPLIER)
            .clamp(SYNTHETIC_DRAWDOWN_FLOOR, SYNTHETIC_DRAWDOWN_CAP),
    )
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(month: &str, gain: f64, cumulated_investment: f64) -> MonthlyRecord {
        MonthlyRecord::from_amounts(month, 0.0, gain, cumulated_investment, 0.0)
    }

    #[test]
    fn test_monthly_returns_skips_non_positive_base() {
        let records = vec![
            record("01/2024", 0.0, 0.0),
            record("02/2024", 50.0, 1000.0),
            record("03/2024", 20.0, 1000.0),
            record("04/2024", -10.0, 2000.0),
        ];
        let returns = monthly_returns(&records);
        // First pair has a zero base and is excluded
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.02).abs() < 1e-10);
        assert!((returns[1] - (-0.01)).abs() < 1e-10);
    }

    #[test]
    fn test_monthly_returns_short_input() {
        assert!(monthly_returns(&[]).is_empty());
        assert!(monthly_returns(&[record("01/2024", 10.0, 100.0)]).is_empty());
    }

    #[test]
    fn test_population_std_dev() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((population_std_dev(&values) - 2.0).abs() < 1e-10);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_value_at_risk_small_series() {
        let returns = vec![0.05, -0.02, 0.03, -0.01];
        assert!((value_at_risk(&returns, 0.95) - (-0.02)).abs() < 1e-12);
        assert!((conditional_value_at_risk(&returns, 0.95) - (-0.02)).abs() < 1e-12);
    }

    #[test]
    fn test_cvar_averages_tail() {
        let returns: Vec<f64> = (0..40).map(|i| (i as f64 - 10.0) / 100.0).collect();
        // idx = floor(0.05 * 40) = 2 -> sorted[2] = -0.08
        let var = value_at_risk(&returns, 0.95);
        let cvar = conditional_value_at_risk(&returns, 0.95);
        assert!((var - (-0.08)).abs() < 1e-12);
        assert!((cvar - (-0.09)).abs() < 1e-12);
        assert!(cvar <= var);
    }

    #[test]
    fn test_var_empty_and_out_of_range() {
        assert_eq!(value_at_risk(&[], 0.95), 0.0);
        assert_eq!(conditional_value_at_risk(&[], 0.95), 0.0);
        // confidence 0 -> idx = len, outside the series
        assert_eq!(value_at_risk(&[0.01, 0.02], 0.0), 0.0);
        assert_eq!(conditional_value_at_risk(&[0.01, 0.02], 0.0), 0.0);
    }

    #[test]
    fn test_correlation_identities() {
        let a = vec![0.01, -0.02, 0.03, 0.015, -0.005];
        assert!((correlation(&a, &a) - 1.0).abs() < 1e-10);

        let neg: Vec<f64> = a.iter().map(|x| -2.0 * x).collect();
        assert!((correlation(&a, &neg) + 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_correlation_small_scale_series() {
        let a = vec![1e-9, 2e-9, 3e-9, 5e-9];
        assert!((correlation(&a, &a) - 1.0).abs() < 1e-10);

        let b = vec![4e-12, 3e-12, 2e-12, 0.5e-12];
        assert!(correlation(&a, &b) < -0.9);
    }

    #[test]
    fn test_correlation_fallbacks() {
        assert_eq!(correlation(&[0.1, 0.1, 0.1], &[0.2, 0.2, 0.2]), 0.0);
        assert_eq!(correlation(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(correlation(&[], &[]), 0.0);
    }

    #[test]
    fn test_max_drawdown() {
        let values = vec![100.0, 110.0, 105.0, 95.0, 100.0, 115.0, 108.0];
        // Peak 110, trough 95
        assert!((max_drawdown(&values) - 15.0 / 110.0 * 100.0).abs() < 1e-9);
        assert_eq!(max_drawdown(&[]), 0.0);
        assert_eq!(max_drawdown(&[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_synthetic_drawdown_requires_monotonic_long_series() {
        let rising: Vec<f64> = (0..12).map(|i| 10_000.0 + i as f64 * 100.0).collect();
        let estimate = estimate_synthetic_drawdown(&rising).unwrap();
        assert!((5.0..=15.0).contains(&estimate));
        let expected = ((11_100.0_f64 / 10_000.0).powf(1.0 / 12.0) - 1.0) * 800.0;
        assert!((estimate - expected).abs() < 1e-9);

        // Exactly 10 points is not enough
        assert!(estimate_synthetic_drawdown(&rising[..10]).is_none());

        let mut dipping = rising.clone();
        dipping[5] = 9_000.0;
        assert!(estimate_synthetic_drawdown(&dipping).is_none());
    }

    #[test]
    fn test_synthetic_drawdown_clamps() {
        let flat = vec![1000.0; 24];
        assert_eq!(estimate_synthetic_drawdown(&flat), Some(5.0));

        let steep: Vec<f64> = (0..12).map(|i| 1000.0 * 2.0_f64.powi(i)).collect();
        assert_eq!(estimate_synthetic_drawdown(&steep), Some(15.0));

        let from_zero: Vec<f64> = (0..12).map(|i| i as f64 * 100.0).collect();
        assert_eq!(estimate_synthetic_drawdown(&from_zero), Some(15.0));
    }

    #[test]
    fn test_synthetic_drawdown_undefined_growth_uses_floor() {
        let zeros = vec![0.0; 12];
        assert_eq!(estimate_synthetic_drawdown(&zeros), Some(5.0));

        let negative: Vec<f64> = (0..12).map(|i| -1200.0 + i as f64 * 50.0).collect();
        assert_eq!(estimate_synthetic_drawdown(&negative), Some(5.0));
    }
}
