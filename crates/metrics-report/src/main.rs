//! metrics-report: compute portfolio performance and risk metrics for a monthly
//! contribution/gain series and print them as a table or JSON.
//!
//! Usage:
//!   cargo run -p metrics-report -- --input plan.json
//!   cargo run -p metrics-report -- --input plan.csv --period trailing:12 --format json
//!   cargo run -p metrics-report -- --input plan.json --period year-end --no-synthetic-drawdown
//!
//! Every flag has an environment fallback (`METRICS_INPUT`, `METRICS_PERIOD`,
//! `METRICS_FORMAT`, `METRICS_RISK_FREE_RATE`, `METRICS_VAR_CONFIDENCE`,
//! `METRICS_SYNTHETIC_DRAWDOWN`), and a `.env` file is honored.

mod config;
mod period;
mod render;
mod source;

use anyhow::Context;
use metrics_core::{validate_series, MetricsRenderer, MonthlySeriesSource};
use metrics_engine::MetricsCalculator;

use config::ReportConfig;

const USAGE: &str = "\
usage: metrics-report --input <file.json|file.csv> [--period all|trailing:N|Nm|year-end[:YYYY]]
                      [--format table|json] [--no-synthetic-drawdown]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "metrics_report=info,metrics_engine=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = ReportConfig::from_env()?;
    config.apply_args(&args)?;

    let input = config
        .input
        .clone()
        .with_context(|| format!("no input file given\n{}", USAGE))?;

    let source = source::source_for_path(&input);
    let records = source
        .monthly_series()
        .await
        .with_context(|| format!("failed to load monthly series from {}", input.display()))?;
    tracing::info!("Loaded {} monthly records from {}", records.len(), input.display());

    if let Err(e) = validate_series(&records) {
        tracing::warn!("Monthly series looks inconsistent: {}", e);
    }

    let window = config.period.slice(&records);
    if window.is_empty() {
        tracing::warn!("No months in period {}, every metric will be zero", config.period);
    } else {
        tracing::info!(
            "Analyzing {} months ({} to {}, period {})",
            window.len(),
            window[0].month,
            window[window.len() - 1].month,
            config.period
        );
    }

    let report = MetricsCalculator::new(config.engine).report(window);
    if report.drawdown.synthetic {
        tracing::info!("Series never declines, max drawdown is an estimate");
    }

    let output = config.renderer().render(&report)?;
    println!("{}", output);
    Ok(())
}
