//! API error types for the Trello client.

use std::error::Error as StdError;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Trello API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a complete response: DNS, connect, TLS,
    /// truncated body, timeout or cancellation.
    #[error("Network error: {message}")]
    Transport {
        /// The full cause chain, flattened.
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Trello answered with a non-success status.
    #[error("Error from Trello API ({status}): {body}")]
    Api {
        /// The HTTP status.
        status: StatusCode,
        /// The raw response body.
        body: String,
    },

    /// Trello answered 2xx but the body was not the expected JSON.
    #[error("invalid JSON from Trello API: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request URL could not be built from the configured base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// The error returned when the caller's cancellation token fires.
    pub fn cancelled() -> Self {
        ApiError::Transport {
            message: "request cancelled".to_string(),
            source: None,
        }
    }

    /// Create an error from a non-success HTTP response.
    pub fn from_status(status: StatusCode, body: impl Into<String>) -> Self {
        ApiError::Api {
            status,
            body: body.into(),
        }
    }

    /// Check if this is a transport-level failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the key and token in its query.
        let err = err.without_url();
        ApiError::Transport {
            message: error_chain(&err),
            source: Some(err),
        }
    }
}

/// Join an error and all of its sources into one line.
///
/// reqwest keeps the interesting part (resolver text, early EOF) in the
/// source chain rather than in its own `Display`.
fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
