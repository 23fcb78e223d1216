use std::path::{Path, PathBuf};

use async_trait::async_trait;
use metrics_core::{MetricsError, MonthlyRecord, MonthlySeriesSource, RawMonthlyRecord};
use serde::Deserialize;
use serde_json::Value;

/// Reads a JSON array of monthly records.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MonthlySeriesSource for JsonFileSource {
    async fn monthly_series(&self) -> Result<Vec<MonthlyRecord>, MetricsError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<MonthlyRecord> = serde_json::from_str(&raw)?;
        Ok(records)
    }
}

/// Reads a headered CSV export with the same column names as the JSON form.
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CsvRow {
    month: Option<String>,
    investment: Option<String>,
    monthly_gain: Option<String>,
    cumulated_investment: Option<String>,
    cumulated_gains: Option<String>,
    total_portfolio: Option<String>,
    roi: Option<String>,
}

impl From<CsvRow> for RawMonthlyRecord {
    fn from(row: CsvRow) -> Self {
        RawMonthlyRecord {
            month: row.month.map(Value::String),
            investment: row.investment.map(Value::String),
            monthly_gain: row.monthly_gain.map(Value::String),
            cumulated_investment: row.cumulated_investment.map(Value::String),
            cumulated_gains: row.cumulated_gains.map(Value::String),
            total_portfolio: row.total_portfolio.map(Value::String),
            roi: row.roi.map(Value::String),
        }
    }
}

#[async_trait]
impl MonthlySeriesSource for CsvFileSource {
    async fn monthly_series(&self) -> Result<Vec<MonthlyRecord>, MetricsError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        parse_csv(&raw)
    }
}

fn parse_csv(raw: &str) -> Result<Vec<MonthlyRecord>, MetricsError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| MetricsError::Parse(format!("CSV row {}: {}", line + 1, e)))?;
        records.push(MonthlyRecord::from(RawMonthlyRecord::from(row)));
    }
    Ok(records)
}

/// Pick a source by file extension; anything that is not `.csv` is read as JSON.
pub fn source_for_path(path: &Path) -> Box<dyn MonthlySeriesSource> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Box::new(CsvFileSource::new(path))
    } else {
        Box::new(JsonFileSource::new(path))
    }
}
