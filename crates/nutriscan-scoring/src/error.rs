use thiserror::Error;

/// Failures from the scoring service. Propagated to callers as-is.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("scoring service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The reply did not contain a `{"score", "comment"}` object.
    #[error("malformed scoring output: {0}")]
    MalformedOutput(String),

    #[error("score {0} is outside 0-100")]
    ScoreOutOfRange(i64),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
