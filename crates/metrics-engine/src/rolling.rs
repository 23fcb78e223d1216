use metrics_core::{MetricsResult, MonthlyRecord, RollingMetrics, RollingPoint, RollingSeries};
use rayon::prelude::*;

use crate::calculator::MetricsCalculator;

/// Window sizing for a rolling series: `clamp(n / 2, min_window, max_window)`,
/// produced only when the input has at least `min_records` months.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPolicy {
    pub min_window: usize,
    pub max_window: usize,
    pub min_records: usize,
}

impl WindowPolicy {
    /// Volatility, Sharpe and Sortino
    pub const SHORT: Self = Self {
        min_window: 3,
        max_window: 12,
        min_records: 6,
    };

    pub const CALMAR: Self = Self {
        min_window: 6,
        max_window: 36,
        min_records: 12,
    };

    pub fn window_for(&self, months: usize) -> Option<usize> {
        if months < self.min_records || months < self.min_window {
            return None;
        }
        Some((months / 2).clamp(self.min_window, self.max_window))
    }
}

/// Rolling volatility, Sharpe, Sortino and Calmar, each labeled by the
/// window's last month.
pub fn compute_rolling(
    calculator: &MetricsCalculator,
    records: &[MonthlyRecord],
) -> RollingMetrics {
    let mut rolling = RollingMetrics::default();

    if let Some(window) = WindowPolicy::SHORT.window_for(records.len()) {
        let windows = windowed_metrics(calculator, records, window);
        rolling.volatility = to_series(window, &windows, |m| m.volatility);
        rolling.sharpe = to_series(window, &windows, |m| m.sharpe_ratio);
        rolling.sortino = to_series(window, &windows, |m| m.sortino_ratio);
    }

    if let Some(window) = WindowPolicy::CALMAR.window_for(records.len()) {
        let windows = windowed_metrics(calculator, records, window);
        rolling.calmar = to_series(window, &windows, |m| m.calmar_ratio);
    }

    tracing::debug!(
        "Rolling series over {} months: {} short-window points, {} calmar points",
        records.len(),
        rolling.sharpe.points.len(),
        rolling.calmar.points.len()
    );

    rolling
}

/// Metrics for every window position, in chronological order.
fn windowed_metrics(
    calculator: &MetricsCalculator,
    records: &[MonthlyRecord],
    window: usize,
) -> Vec<(String, MetricsResult)> {
    if window == 0 || records.len() < window {
        return Vec::new();
    }

    (window..records.len() + 1)
        .into_par_iter()
        .map(|end| {
            let slice = &records[end - window..end];
            (slice[window - 1].month.clone(), calculator.compute(slice))
        })
        .collect()
}

fn to_series(
    window: usize,
    windows: &[(String, MetricsResult)],
    pick: impl Fn(&MetricsResult) -> f64,
) -> RollingSeries {
    RollingSeries {
        window,
        points: windows
            .iter()
            .map(|(month, metrics)| RollingPoint {
                month: month.clone(),
                value: pick(metrics),
            })
            .collect(),
    }
}
