//! Request error taxonomy.

use reqwest::StatusCode;
use thiserror::Error;

use crate::resilience::retries::{Classify, ErrorClass};

/// Errors surfaced by [`ResilientClient`](crate::client::ResilientClient).
///
/// Status-bearing variants display as the status line followed by the
/// server's message, e.g. `500 Internal Server Error` or
/// `401 Unauthorized: session expired`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server rejected the credentials (401).
    #[error("{}{}", StatusCode::UNAUTHORIZED, detail(.message))]
    Unauthorized { message: String },

    /// The server failed with 500, 502 or 503.
    #[error("{}{}", .status, detail(.message))]
    Server { status: StatusCode, message: String },

    /// Any other non-success status.
    #[error("{}{}", .status, detail(.message))]
    Api { status: StatusCode, message: String },

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The attempt exceeded its deadline.
    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    /// The response body was not valid JSON.
    #[error("invalid JSON response: {0}")]
    Decode(String),

    /// The endpoint could not be turned into a URL.
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    /// The request could not be built (bad header name or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported as free-form text.
    #[error("{0}")]
    Other(String),
}

/// Result type for request operations.
pub type RequestResult<T> = Result<T, RequestError>;

fn detail(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

impl RequestError {
    /// Map a non-success response to the matching variant.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status.as_u16() {
            401 => RequestError::Unauthorized { message },
            500 | 502 | 503 => RequestError::Server { status, message },
            _ => RequestError::Api { status, message },
        }
    }

    /// Status code carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            RequestError::Server { status, .. } | RequestError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            RequestError::InvalidRequest(e.to_string())
        } else {
            RequestError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(e: serde_json::Error) -> Self {
        RequestError::Decode(e.to_string())
    }
}

/// Typed variants are classified by what they are, not by their text: a
/// `500 Internal Server Error: session store unavailable` is `Server` (fixed
/// delay, no session refresh) even though its message would match the auth
/// patterns. Only `Api` and `Other`, which carry no typed meaning, fall back to
/// [`ErrorClass::from_message`] and its auth > network > server precedence.
impl Classify for RequestError {
    fn class(&self) -> ErrorClass {
        match self {
            RequestError::Unauthorized { .. } => ErrorClass::Auth,
            RequestError::Server { .. } => ErrorClass::Server,
            RequestError::Network(_) | RequestError::Timeout(_) => ErrorClass::Network,
            RequestError::Decode(_)
            | RequestError::InvalidEndpoint(_)
            | RequestError::InvalidRequest(_) => ErrorClass::Fatal,
            // Untyped failures fall back to the message patterns, so a 400
            // saying "session expired" or a 504 still recover.
            RequestError::Api { .. } | RequestError::Other(_) => {
                ErrorClass::from_message(&self.to_string())
            }
        }
    }
}

/// Pull a human message out of an error body.
///
/// JSON bodies with an `error` or `message` string use that field; anything
/// else is used verbatim.
fn extract_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        for key in ["error", "message"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    trimmed.to_string()
}
