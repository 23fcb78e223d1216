use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use metrics_core::{MonthLabel, MonthlyRecord};

/// Contiguous slice of the monthly series handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    /// Last `n` months
    Trailing(usize),
    /// From the first month through December of the given year
    UntilYearEnd(i32),
}

impl Period {
    pub fn slice<'a>(&self, records: &'a [MonthlyRecord]) -> &'a [MonthlyRecord] {
        match *self {
            Period::All => records,
            Period::Trailing(n) => &records[records.len().saturating_sub(n)..],
            Period::UntilYearEnd(year) => {
                // Labels that fail to parse never end the slice
                let end = records
                    .iter()
                    .position(|r| {
                        MonthLabel::parse(&r.month)
                            .map(|label| label.year() > year)
                            .unwrap_or(false)
                    })
                    .unwrap_or(records.len());
                &records[..end]
            }
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "all" => return Ok(Period::All),
            "year-end" => return Ok(Period::UntilYearEnd(Local::now().year())),
            _ => {}
        }

        if let Some(year) = s.strip_prefix("year-end:") {
            let year: i32 = year
                .parse()
                .with_context(|| format!("invalid year in period {:?}", s))?;
            return Ok(Period::UntilYearEnd(year));
        }

        let months = s
            .strip_prefix("trailing:")
            .or_else(|| s.strip_suffix('m'))
            .with_context(|| {
                format!("unknown period {:?} (expected all, trailing:N, Nm, year-end[:YYYY])", s)
            })?;
        let months: usize = months
            .parse()
            .with_context(|| format!("invalid month count in period {:?}", s))?;
        if months == 0 {
            bail!("trailing period must cover at least one month");
        }
        Ok(Period::Trailing(months))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => write!(f, "all"),
            Period::Trailing(n) => write!(f, "trailing:{}", n),
            Period::UntilYearEnd(year) => write!(f, "year-end:{}", year),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn months(labels: &[&str]) -> Vec<MonthlyRecord> {
        labels
            .iter()
            .map(|m| MonthlyRecord::from_amounts(*m, 100.0, 1.0, 100.0, 1.0))
            .collect()
    }

    #[test]
    fn test_parse_periods() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert_eq!("trailing:12".parse::<Period>().unwrap(), Period::Trailing(12));
        assert_eq!("24M".parse::<Period>().unwrap(), Period::Trailing(24));
        assert_eq!("year-end:2025".parse::<Period>().unwrap(), Period::UntilYearEnd(2025));
        assert_eq!(
            "year-end".parse::<Period>().unwrap(),
            Period::UntilYearEnd(Local::now().year())
        );
        assert!("trailing:0".parse::<Period>().is_err());
        assert!("forever".parse::<Period>().is_err());
        assert!("year-end:soon".parse::<Period>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for period in [Period::All, Period::Trailing(6), Period::UntilYearEnd(2030)] {
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
    }

    #[test]
    fn test_trailing_slice() {
        let records = months(&["10/2024", "11/2024", "12/2024", "01/2025"]);
        let slice = Period::Trailing(2).slice(&records);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].month, "12/2024");
        assert_eq!(Period::Trailing(10).slice(&records).len(), 4);
        assert_eq!(Period::All.slice(&records).len(), 4);
    }

    #[test]
    fn test_until_year_end_slice() {
        let records = months(&["11/2024", "12/2024", "01/2025", "02/2025"]);
        let slice = Period::UntilYearEnd(2024).slice(&records);
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[1].month, "12/2024");
        assert_eq!(Period::UntilYearEnd(2023).slice(&records).len(), 0);
        assert_eq!(Period::UntilYearEnd(2030).slice(&records).len(), 4);
    }

    #[test]
    fn test_until_year_end_keeps_unparseable_labels() {
        let records = months(&["12/2024", "bogus", "01/2025"]);
        assert_eq!(Period::UntilYearEnd(2024).slice(&records).len(), 2);
    }
}
