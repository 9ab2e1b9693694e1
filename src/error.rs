//! Error types for pipe execution.
//!
//! Failures never escape a pipe as a raw fault: internals propagate
//! [`PipeError`] with `?`, and the outermost pipe boundary folds any error
//! into the [`ErrorValue`] envelope the host renders to the end user.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while a pipe translates and forwards a request.
#[derive(Error, Debug)]
pub enum PipeError {
    /// HTTP request/transport errors
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Upstream API returned an error response
    #[error("API error {code}: {message}")]
    ApiError {
        /// HTTP status code
        code: u16,
        /// Error message, preferring the upstream's own wording
        message: String,
        /// Parsed upstream error body, when one was available
        details: Option<serde_json::Value>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Malformed individual stream event
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Stream processing errors
    #[error("Stream error: {0}")]
    StreamError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<reqwest::Error> for PipeError {
    fn from(error: reqwest::Error) -> Self {
        Self::HttpError(error.to_string())
    }
}

impl PipeError {
    /// Create a new API error without details
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
            details: None,
        }
    }
}

/// Classify a non-2xx HTTP response by parsing the upstream error body.
///
/// Upstream APIs surface failures as an `{"error": ...}` envelope. When the
/// body parses and carries that field, the upstream's own message wins (a
/// string field is used verbatim, anything structured is rendered as compact
/// JSON) and the parsed body rides along as details. Anything else becomes a
/// plain HTTP error with the raw status and text.
pub(crate) fn classify_http_error(status: u16, body_text: &str) -> PipeError {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body_text) {
        if let Some(error_field) = json.get("error") {
            let message = match error_field {
                serde_json::Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            return PipeError::ApiError {
                code: status,
                message,
                details: Some(json),
            };
        }
    }

    PipeError::HttpError(format!("HTTP error {status}: {body_text}"))
}

/// The `{error}` envelope a pipe hands back to the host when a call fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorValue {
    /// Human-readable description of the failure
    pub error: String,
}

impl ErrorValue {
    /// Create an error value from any displayable message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_prefers_upstream_error_string() {
        let err = classify_http_error(401, r#"{"error":"invalid key"}"#);
        match err {
            PipeError::ApiError {
                code,
                message,
                details,
            } => {
                assert_eq!(code, 401);
                assert_eq!(message, "invalid key");
                assert!(details.is_some());
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn classify_renders_structured_error_field_as_json() {
        let err = classify_http_error(
            400,
            r#"{"error":{"message":"bad request","type":"invalid_request_error"}}"#,
        );
        match err {
            PipeError::ApiError { message, .. } => {
                assert!(message.contains("bad request"));
                assert!(message.contains("invalid_request_error"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn classify_falls_back_to_raw_status_and_text() {
        let err = classify_http_error(502, "upstream unavailable");
        match err {
            PipeError::HttpError(text) => {
                assert!(text.contains("502"));
                assert!(text.contains("upstream unavailable"));
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn classify_ignores_json_without_error_field() {
        let err = classify_http_error(500, r#"{"message":"oops"}"#);
        assert!(matches!(err, PipeError::HttpError(_)));
    }

    #[test]
    fn error_value_serializes_to_host_envelope() {
        let value = ErrorValue::new("something failed");
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, serde_json::json!({"error": "something failed"}));
    }
}
