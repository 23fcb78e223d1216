use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::MetricsError;
use crate::types::MonthlyRecord;

/// Loosely-typed record as it arrives from storage or a file.
///
/// Every numeric field may be a number, a numeric string, `null`, or absent.
/// Conversion into [`MonthlyRecord`] is the only place where those cases are
/// coerced to zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMonthlyRecord {
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub investment: Option<Value>,
    #[serde(default)]
    pub monthly_gain: Option<Value>,
    #[serde(default)]
    pub cumulated_investment: Option<Value>,
    #[serde(default)]
    pub cumulated_gains: Option<Value>,
    #[serde(default)]
    pub total_portfolio: Option<Value>,
    #[serde(default)]
    pub roi: Option<Value>,
}

impl From<RawMonthlyRecord> for MonthlyRecord {
    fn from(raw: RawMonthlyRecord) -> Self {
        let month = match raw.month {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Self {
            month,
            investment: coerce_number(raw.investment.as_ref()),
            monthly_gain: coerce_number(raw.monthly_gain.as_ref()),
            cumulated_investment: coerce_number(raw.cumulated_investment.as_ref()),
            cumulated_gains: coerce_number(raw.cumulated_gains.as_ref()),
            total_portfolio: coerce_number(raw.total_portfolio.as_ref()),
            roi: coerce_number(raw.roi.as_ref()),
        }
    }
}

/// Numbers pass through, numeric strings are parsed, everything else is 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// A parsed `MM/YYYY` label. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthLabel {
    year: i32,
    month: u32,
}

impl MonthLabel {
    pub fn new(year: i32, month: u32) -> Result<Self, MetricsError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| Self { year, month })
            .ok_or_else(|| MetricsError::InvalidMonth(format!("{:02}/{}", month, year)))
    }

    pub fn parse(label: &str) -> Result<Self, MetricsError> {
        let invalid = || MetricsError::InvalidMonth(label.to_string());
        let (month, year) = label.trim().split_once('/').ok_or_else(invalid)?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;
        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Constructors only admit valid year/month pairs
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }
}

impl FromStr for MonthLabel {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

/// Check that every label parses and months are strictly ascending.
///
/// The engine does not require this; callers use it to flag suspicious feeds.
pub fn validate_series(records: &[MonthlyRecord]) -> Result<(), MetricsError> {
    let mut previous: Option<MonthLabel> = None;
    for record in records {
        let label = MonthLabel::parse(&record.month)?;
        if let Some(prev) = previous {
            if label == prev {
                return Err(MetricsError::DuplicateMonth(record.month.clone()));
            }
            if label < prev {
                return Err(MetricsError::OutOfOrder {
                    previous: prev.to_string(),
                    current: record.month.clone(),
                });
            }
        }
        previous = Some(label);
    }
    Ok(())
}
