use anyhow::{bail, Context, Result};
use metrics_core::MetricsRenderer;
use metrics_engine::EngineConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::period::Period;
use crate::render::{JsonRenderer, TableRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" | "text" => Ok(OutputFormat::Table),
            other => bail!("unknown output format {:?} (expected json or table)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub input: Option<PathBuf>,
    pub period: Period,
    pub format: OutputFormat,
    pub engine: EngineConfig,
}

impl ReportConfig {
    /// Read `METRICS_INPUT`, `METRICS_PERIOD`, `METRICS_FORMAT` and the engine settings.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            input: env::var("METRICS_INPUT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            period: env::var("METRICS_PERIOD")
                .unwrap_or_else(|_| "all".to_string())
                .parse::<Period>()
                .context("METRICS_PERIOD")?,
            format: env::var("METRICS_FORMAT")
                .unwrap_or_else(|_| "table".to_string())
                .parse::<OutputFormat>()
                .context("METRICS_FORMAT")?,
            engine: EngineConfig::from_env()?,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_args(&mut self, args: &[String]) -> Result<()> {
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--input" => {
                    let value = iter.next().context("--input requires a path")?;
                    self.input = Some(PathBuf::from(value));
                }
                "--period" => {
                    let value = iter.next().context("--period requires a value")?;
                    self.period = value.parse()?;
                }
                "--format" => {
                    let value = iter.next().context("--format requires a value")?;
                    self.format = value.parse()?;
                }
                "--no-synthetic-drawdown" => {
                    self.engine = self.engine.without_synthetic_drawdown();
                }
                other => bail!("unknown argument {:?}", other),
            }
        }
        Ok(())
    }

    pub fn renderer(&self) -> Box<dyn MetricsRenderer> {
        match self.format {
            OutputFormat::Json => Box::new(JsonRenderer),
            OutputFormat::Table => Box::new(TableRenderer),
        }
    }
}
