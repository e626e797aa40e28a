//! Client error types and HTTP status mapping

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that cross the streaming-core boundary
///
/// Malformed individual stream frames never surface here: the parser
/// absorbs them. Cancellation is a status
/// ([`StreamOutcome::Cancelled`](crate::stream::StreamOutcome)), not an
/// error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Precondition failure: rejected before any network activity
    #[error("no API key configured; add one in settings before sending")]
    MissingApiKey,

    /// Non-success HTTP status with the server's own message when present
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Network-level failure (connect, timeout, mid-stream read)
    #[error("network error: {0}")]
    Network(String),

    /// The response body could not be decoded at all
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Credential/model check against the discovery endpoint failed
    #[error("validation failed: {0}")]
    Validation(String),

    /// Client-side setup error (bad base URL, TLS backend failure)
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            ClientError::Network(format!("connection failed: {err}"))
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Map a non-success HTTP status and response body to a [`ClientError`]
///
/// The body message is preferred over the bare status line when the server
/// sent one in a recognizable shape.
pub fn map_status_error(status: StatusCode, body: Option<String>) -> ClientError {
    let message = body
        .as_deref()
        .and_then(extract_error_message)
        .or(body)
        .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));

    ClientError::Http {
        status: status.as_u16(),
        message,
    }
}

/// Pull a human-readable message out of a JSON error body
///
/// Handles the OpenAI-style `{ "error": { "message": ... } }` shape, the
/// flat `{ "message": ... }` shape, and `{ "error": "..." }`.
fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    if let Some(message) = json
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }

    if let Some(message) = json.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    if let Some(message) = json.get("error").and_then(Value::as_str) {
        return Some(message.to_string());
    }

    None
}
