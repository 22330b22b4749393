use thiserror::Error;

/// Adapter-level fetch failure. The scheduler recovers from these per source;
/// they never abort the overall scrape.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("request error: {0}")]
    Request(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Skill-extraction service failure. Recovered locally via the keyword
/// heuristic fallback.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction service unreachable: {0}")]
    Service(String),

    #[error("extraction service returned HTTP {0}")]
    Status(u16),

    #[error("malformed extraction response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        ExtractionError::Service(e.to_string())
    }
}
