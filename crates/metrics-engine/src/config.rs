use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Annual risk-free rate in percent.
pub const DEFAULT_RISK_FREE_RATE: f64 = 2.0;
pub const DEFAULT_VAR_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Percent per year, used by Sharpe and Sortino
    pub risk_free_rate: f64,
    /// Confidence level for the reported VaR/CVaR pair
    pub var_confidence: f64,
    /// Replace the zero drawdown of long non-decreasing series with the growth-based estimate
    pub synthetic_drawdown: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            var_confidence: DEFAULT_VAR_CONFIDENCE,
            synthetic_drawdown: true,
        }
    }
}

impl EngineConfig {
    /// Load overrides from `METRICS_RISK_FREE_RATE`, `METRICS_VAR_CONFIDENCE`
    /// and `METRICS_SYNTHETIC_DRAWDOWN`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            risk_free_rate: env_or("METRICS_RISK_FREE_RATE", defaults.risk_free_rate)?,
            var_confidence: env_or("METRICS_VAR_CONFIDENCE", defaults.var_confidence)?,
            synthetic_drawdown: env_or("METRICS_SYNTHETIC_DRAWDOWN", defaults.synthetic_drawdown)?,
        })
    }

    pub fn without_synthetic_drawdown(mut self) -> Self {
        self.synthetic_drawdown = false;
        self
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        _ => Ok(default),
    }
}
