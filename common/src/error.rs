use thiserror::Error;

/// Failure of a single challenge request. Surfaced to the user only as the
/// generic error banner; the variant is for logs and tests.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("could not decode challenge response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no CSRF token available")]
    MissingCsrfToken,
    #[error("page url is not usable: {0}")]
    InvalidPageUrl(#[from] url::ParseError),
}
