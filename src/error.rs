use thiserror::Error;

/// Failure taxonomy for the estimation pipeline.
///
/// Provider failures are converted into fallback values at each component
/// boundary; the only variants that ever reach an API caller are
/// `DataUnavailable` (no roof area determinable by any path) and `Config`.
#[derive(Error, Debug)]
pub enum EstimateError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EstimateError {
    fn from(e: reqwest::Error) -> Self {
        // Timeouts, connect errors and non-success statuses all collapse to
        // the same variant: callers only branch on "the service did not
        // deliver", never on the transport detail.
        EstimateError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for EstimateError {
    fn from(e: serde_json::Error) -> Self {
        EstimateError::DataUnavailable(format!("malformed response: {}", e))
    }
}

pub type EstimateResult<T> = Result<T, EstimateError>;
