//! Groq API error types.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when calling the Groq API.
#[derive(Debug, Error)]
pub enum GroqError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The response contained no choices.
    #[error("Empty response: no choices returned")]
    EmptyResponse,
}

/// Error body returned by the Groq API.
#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiErrorDetail {
    pub message: String,
}
