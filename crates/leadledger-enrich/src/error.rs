//! Error types for provider HTTP clients.

/// Result type alias for provider client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Provider client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reported by the provider API.
    #[error("Provider API error: {0}")]
    Api(String),

    /// The provider returned a response the client does not understand.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<Error> for leadledger_core::Error {
    fn from(err: Error) -> Self {
        Self::Provider(err.to_string())
    }
}
