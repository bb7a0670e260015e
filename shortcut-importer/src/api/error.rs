//! HTTP client error types.

use thiserror::Error;

/// Errors raised by [`ApiClient`](super::ApiClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote service answered with a non-2xx status.
    #[error("{service} API returned {status}: {message}")]
    Remote {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request body could not be encoded as JSON.
    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// A path could not be joined onto the base URL.
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The API token is not a valid header value.
    #[error("Invalid {service} token: {source}")]
    InvalidToken {
        service: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },
}

impl ApiError {
    /// Returns true if the remote service reported the resource as missing (404).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Remote { status, .. } => *status == 404,
            Self::Http(e) => e.status().is_some_and(|s| s.as_u16() == 404),
            _ => false,
        }
    }
}
