use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {source_name} (HTTP {status}): {message}")]
    Api {
        source_name: String,
        status: u16,
        message: String,
    },

    #[error("rate limit from {0}, retry after {1}s")]
    RateLimit(String, u64),

    #[error("lookup timed out after {0}ms")]
    Timeout(u64),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("config error: {0}")]
    Config(#[from] trackscope_core::TrackscopeError),
}

impl MatchError {
    /// Whether retrying the same lookup may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            MatchError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            MatchError::Api { status, .. } => *status >= 500,
            MatchError::RateLimit(..) | MatchError::Timeout(_) | MatchError::SourceUnavailable(_) => {
                true
            }
            MatchError::Parse(_)
            | MatchError::InvalidArgument(_)
            | MatchError::InvalidPattern(_)
            | MatchError::Config(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;
