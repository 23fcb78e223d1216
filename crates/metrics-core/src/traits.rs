use async_trait::async_trait;

use crate::{MetricsError, MetricsReport, MonthlyRecord};

/// Supplies the ordered monthly series an analysis runs over
#[async_trait]
pub trait MonthlySeriesSource: Send + Sync {
    async fn monthly_series(&self) -> Result<Vec<MonthlyRecord>, MetricsError>;
}

/// Turns a computed report into its presentation form
pub trait MetricsRenderer {
    fn render(&self, report: &MetricsReport) -> Result<String, MetricsError>;
}
