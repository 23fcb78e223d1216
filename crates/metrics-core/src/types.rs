use serde::{Deserialize, Serialize};

use crate::record::RawMonthlyRecord;

/// One month of a contribution/gain series, as produced by the budgeting side.
///
/// Deserialization always goes through [`RawMonthlyRecord`], so missing or
/// non-numeric amounts arrive here as zero. Any finite amount is kept as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawMonthlyRecord")]
pub struct MonthlyRecord {
    /// Calendar label, `MM/YYYY`
    pub month: String,
    pub investment: f64,
    pub monthly_gain: f64,
    pub cumulated_investment: f64,
    pub cumulated_gains: f64,
    /// Mark-to-date value, `cumulated_investment + cumulated_gains`
    pub total_portfolio: f64,
    /// Cumulative return percentage as of this month
    pub roi: f64,
}

impl MonthlyRecord {
    /// Build a record from plain amounts. `total_portfolio` and `roi` are derived.
    pub fn from_amounts(
        month: impl Into<String>,
        investment: f64,
        monthly_gain: f64,
        cumulated_investment: f64,
        cumulated_gains: f64,
    ) -> Self {
        let roi = if cumulated_investment > 0.0 {
            cumulated_gains / cumulated_investment * 100.0
        } else {
            0.0
        };
        Self {
            month: month.into(),
            investment,
            monthly_gain,
            cumulated_investment,
            cumulated_gains,
            total_portfolio: cumulated_investment + cumulated_gains,
            roi,
        }
    }
}

/// Scalar performance and risk statistics for one window of records.
///
/// Percent-valued fields are already multiplied by 100. `var_95` and
/// `cvar_95` are raw monthly return fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub calmar_ratio: f64,
    pub win_rate: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub profit_factor: f64,
    pub var_95: f64,
    pub cvar_95: f64,
}

/// Max drawdown together with the branch that produced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownEstimate {
    /// Percent
    pub value: f64,
    /// True when the value is the growth-based estimate rather than an observed decline
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    /// Label of the last month in the window
    pub month: String,
    pub value: f64,
}

/// A statistic recomputed over a sliding window of months.
/// An empty `points` means the series had too few months to be produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingSeries {
    pub window: usize,
    pub points: Vec<RollingPoint>,
}

impl RollingSeries {
    pub fn is_produced(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&RollingPoint> {
        self.points.last()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingMetrics {
    pub volatility: RollingSeries,
    pub sharpe: RollingSeries,
    pub sortino: RollingSeries,
    pub calmar: RollingSeries,
}

/// Everything a renderer needs for one analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub data_points: usize,
    pub metrics: MetricsResult,
    pub drawdown: DrawdownEstimate,
    pub rolling: RollingMetrics,
}
