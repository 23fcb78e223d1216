use std::fmt::Write;

use metrics_core::{MetricsError, MetricsRenderer, MetricsReport, RollingSeries};

/// Pretty-printed JSON of the whole report.
pub struct JsonRenderer;

impl MetricsRenderer for JsonRenderer {
    fn render(&self, report: &MetricsReport) -> Result<String, MetricsError> {
        serde_json::to_string_pretty(report).map_err(|e| MetricsError::Render(e.to_string()))
    }
}

/// Fixed-width text table for terminals.
pub struct TableRenderer;

impl MetricsRenderer for TableRenderer {
    fn render(&self, report: &MetricsReport) -> Result<String, MetricsError> {
        let m = &report.metrics;
        let drawdown_note = if report.drawdown.synthetic { " (estimated)" } else { "" };

        let rows: [(&str, String); 13] = [
            ("Total return", percent(m.total_return)),
            ("Annualized return", percent(m.annualized_return)),
            ("Volatility", percent(m.volatility)),
            ("Sharpe ratio", ratio(m.sharpe_ratio)),
            ("Sortino ratio", ratio(m.sortino_ratio)),
            ("Max drawdown", format!("{}{}", percent(m.max_drawdown), drawdown_note)),
            ("Calmar ratio", ratio(m.calmar_ratio)),
            ("Win rate", percent(m.win_rate)),
            ("Average win", percent(m.average_win)),
            ("Average loss", percent(m.average_loss)),
            ("Profit factor", ratio(m.profit_factor)),
            ("VaR 95%", percent(m.var_95 * 100.0)),
            ("CVaR 95%", percent(m.cvar_95 * 100.0)),
        ];

        let mut out = String::new();
        let w = &mut out;
        writeln!(w, "Portfolio metrics over {} months", report.data_points).map_err(render_err)?;
        writeln!(w, "{}", "-".repeat(40)).map_err(render_err)?;
        for (label, value) in rows.iter() {
            writeln!(w, "{:<22}{:>18}", label, value).map_err(render_err)?;
        }

        let rolling = [
            ("Volatility", &report.rolling.volatility),
            ("Sharpe", &report.rolling.sharpe),
            ("Sortino", &report.rolling.sortino),
            ("Calmar", &report.rolling.calmar),
        ];
        writeln!(w).map_err(render_err)?;
        writeln!(w, "Rolling (latest window)").map_err(render_err)?;
        writeln!(w, "{}", "-".repeat(40)).map_err(render_err)?;
        for (label, series) in rolling {
            writeln!(w, "{:<22}{:>18}", label, latest(series)).map_err(render_err)?;
        }

        Ok(out)
    }
}

fn percent(value: f64) -> String {
    format!("{:.2} %", value)
}

fn ratio(value: f64) -> String {
    format!("{:.2}", value)
}

fn latest(series: &RollingSeries) -> String {
    match series.latest() {
        Some(point) => format!("{:.2} @ {} ({}m)", point.value, point.month, series.window),
        None => "n/a".to_string(),
    }
}

fn render_err(err: std::fmt::Error) -> MetricsError {
    MetricsError::Render(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_core::{DrawdownEstimate, MetricsResult, RollingPoint};

    fn sample_report() -> MetricsReport {
        let mut report = MetricsReport {
            data_points: 24,
            metrics: MetricsResult {
                total_return: 12.5,
                max_drawdown: 6.25,
                var_95: -0.031,
                ..MetricsResult::default()
            },
            drawdown: DrawdownEstimate {
                value: 6.25,
                synthetic: true,
            },
            ..MetricsReport::default()
        };
        report.rolling.sharpe = RollingSeries {
            window: 12,
            points: vec![RollingPoint {
                month: "12/2025".to_string(),
                value: 1.234,
            }],
        };
        report
    }

    #[test]
    fn test_table_renderer() {
        let table = TableRenderer.render(&sample_report()).unwrap();
        assert!(table.contains("Portfolio metrics over 24 months"));
        assert!(table.contains("12.50 %"));
        assert!(table.contains("6.25 % (estimated)"));
        assert!(table.contains("-3.10 %"));
        assert!(table.contains("1.23 @ 12/2025 (12m)"));
        assert!(table.contains("n/a"));
    }

    #[test]
    fn test_json_renderer_round_trips() {
        let report = sample_report();
        let json = JsonRenderer.render(&report).unwrap();
        assert!(json.contains("\"totalReturn\""));
        assert!(json.contains("\"dataPoints\": 24"));
        let parsed: MetricsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
