use metrics_core::{DrawdownEstimate, MetricsReport, MetricsResult, MonthlyRecord, RollingMetrics};

use crate::config::EngineConfig;
use crate::rolling;
use crate::shared_math::{self, finite_or_zero};

/// Sortino reported when no month falls below the risk-free rate and the
/// mean excess return is positive.
pub const SORTINO_NO_DOWNSIDE: f64 = 3.0;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Stateless metrics engine. Every call recomputes from the records it is given.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator {
    config: EngineConfig,
}

impl MetricsCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the full set of scalar statistics. Empty input yields all zeros.
    pub fn compute(&self, records: &[MonthlyRecord]) -> MetricsResult {
        if records.is_empty() {
            return MetricsResult::default();
        }

        let returns = shared_math::monthly_returns(records);
        let total = total_return(records);
        let annualized = annualized_return(total, records.len());
        let vol = volatility(&returns);
        let drawdown = self.drawdown(records);

        tracing::debug!(
            "Computed metrics over {} months ({} usable returns)",
            records.len(),
            returns.len()
        );

        MetricsResult {
            total_return: total,
            annualized_return: annualized,
            volatility: vol,
            sharpe_ratio: sharpe_ratio(annualized, vol, self.config.risk_free_rate),
            sortino_ratio: sortino_ratio(&returns, self.config.risk_free_rate),
            max_drawdown: drawdown.value,
            calmar_ratio: calmar_ratio(annualized, drawdown.value),
            win_rate: win_rate(records),
            average_win: average_win(&returns),
            average_loss: average_loss(&returns),
            profit_factor: profit_factor(&returns),
            var_95: shared_math::value_at_risk(&returns, self.config.var_confidence),
            cvar_95: shared_math::conditional_value_at_risk(&returns, self.config.var_confidence),
        }
    }

    /// Max drawdown of `total_portfolio`, switching to the growth-based
    /// estimate for long non-decreasing series when enabled.
    pub fn drawdown(&self, records: &[MonthlyRecord]) -> DrawdownEstimate {
        let values: Vec<f64> = records.iter().map(|r| r.total_portfolio).collect();

        if self.config.synthetic_drawdown {
            if let Some(value) = shared_math::estimate_synthetic_drawdown(&values) {
                tracing::debug!(
                    "Series of {} months never declines, using estimated drawdown {:.2}%",
                    values.len(),
                    value
                );
                return DrawdownEstimate { value, synthetic: true };
            }
        }

        DrawdownEstimate {
            value: shared_math::max_drawdown(&values),
            synthetic: false,
        }
    }

    pub fn rolling(&self, records: &[MonthlyRecord]) -> RollingMetrics {
        rolling::compute_rolling(self, records)
    }

    pub fn report(&self, records: &[MonthlyRecord]) -> MetricsReport {
        MetricsReport {
            data_points: records.len(),
            metrics: self.compute(records),
            drawdown: self.drawdown(records),
            rolling: self.rolling(records),
        }
    }
}

/// Cumulated gains over cumulated investment at the last month, in percent.
pub fn total_return(records: &[MonthlyRecord]) -> f64 {
    let Some(last) = records.last() else {
        return 0.0;
    };
    let invested = last.cumulated_investment;
    if invested > 0.0 {
        finite_or_zero(last.cumulated_gains / invested * 100.0)
    } else {
        0.0
    }
}

/// Geometric annualization of a total return over `months` months.
pub fn annualized_return(total_return_percent: f64, months: usize) -> f64 {
    let years = months as f64 / MONTHS_PER_YEAR;
    if years <= 0.0 {
        return 0.0;
    }
    finite_or_zero(((1.0 + total_return_percent / 100.0).powf(1.0 / years) - 1.0) * 100.0)
}

/// Annualized volatility of monthly returns, in percent.
pub fn volatility(returns: &[f64]) -> f64 {
    shared_math::population_std_dev(returns) * MONTHS_PER_YEAR.sqrt() * 100.0
}

pub fn sharpe_ratio(annualized_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
    if volatility <= 0.0 {
        return 0.0;
    }
    finite_or_zero((annualized_return - risk_free_rate) / volatility)
}

/// Annualized mean excess return over annualized downside deviation.
///
/// Saturates at [`SORTINO_NO_DOWNSIDE`] when no excess return is negative
/// and the mean excess is positive.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let monthly_rf = risk_free_rate / 100.0 / MONTHS_PER_YEAR;
    let excess: Vec<f64> = returns.iter().map(|r| r - monthly_rf).collect();
    let mean_excess = shared_math::mean(&excess);

    let downside: Vec<f64> = excess.iter().copied().filter(|e| *e < 0.0).collect();
    if downside.is_empty() {
        return if mean_excess > 0.0 { SORTINO_NO_DOWNSIDE } else { 0.0 };
    }

    let squares: Vec<f64> = downside.iter().map(|e| e * e).collect();
    let downside_dev = shared_math::mean(&squares).sqrt();

    let annual_excess = mean_excess * MONTHS_PER_YEAR;
    let annual_downside = downside_dev * MONTHS_PER_YEAR.sqrt();
    finite_or_zero(annual_excess / annual_downside)
}

pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown > 0.0 {
        finite_or_zero(annualized_return / max_drawdown)
    } else {
        0.0
    }
}

/// Share of all months with a positive gain, in percent.
pub fn win_rate(records: &[MonthlyRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let wins = records.iter().filter(|r| r.monthly_gain > 0.0).count();
    wins as f64 / records.len() as f64 * 100.0
}

/// Mean positive monthly return, in percent.
pub fn average_win(returns: &[f64]) -> f64 {
    mean_positive(returns) * 100.0
}

/// Mean absolute negative monthly return, in percent.
pub fn average_loss(returns: &[f64]) -> f64 {
    mean_abs_negative(returns) * 100.0
}

pub fn profit_factor(returns: &[f64]) -> f64 {
    let loss = mean_abs_negative(returns);
    if loss == 0.0 {
        return 0.0;
    }
    finite_or_zero((mean_positive(returns) / loss).abs())
}

fn mean_positive(returns: &[f64]) -> f64 {
    let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
    shared_math::mean(&wins)
}

fn mean_abs_negative(returns: &[f64]) -> f64 {
    let losses: Vec<f64> = returns
        .iter()
        .filter(|r| **r < 0.0)
        .map(|r| r.abs())
        .collect();
    shared_math::mean(&losses)
}
