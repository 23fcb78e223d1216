use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Invalid month label: {0}")]
    InvalidMonth(String),

    #[error("Month {current} is not after {previous}")]
    OutOfOrder { previous: String, current: String },

    #[error("Duplicate month: {0}")]
    DuplicateMonth(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for MetricsError {
    fn from(err: serde_json::Error) -> Self {
        MetricsError::Parse(err.to_string())
    }
}
