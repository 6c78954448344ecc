//! Error types for FMC operations.
//!
//! This module provides the error type shared by every FMC crate, HTTP status
//! code mapping, and decoding of the error documents the FMC returns.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for FMC operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// FMC is unreachable or answered with a server error
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Operation timed out
    #[error("Timeout waiting for FMC: {0}")]
    Timeout(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with details
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Access token rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks permission for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Conflict error
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit retries exhausted
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Validation error (local precondition or server-side 422)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Failed to parse an FMC response
    #[error("Failed to parse FMC response: {0}")]
    ParseError(String),

    /// Invalid identifier format
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// Invalid IP address, network or range
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Token generation or refresh failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Operation not supported by the resource or server version
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Specialized result type for FMC operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error document returned by the FMC on failed requests.
///
/// ```json
/// {"error": {"category": "FRAMEWORK", "severity": "ERROR",
///            "messages": [{"description": "Duplicate Name"}]}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FmcErrorBody {
    /// Error details
    #[serde(default)]
    pub error: FmcErrorDetail,
}

/// Error detail section of an [`FmcErrorBody`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FmcErrorDetail {
    /// Error category (e.g. `FRAMEWORK`, `VALIDATION`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Severity reported by the FMC
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Individual messages
    #[serde(default)]
    pub messages: Vec<FmcErrorMessage>,
}

/// A single message inside an FMC error document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FmcErrorMessage {
    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl FmcErrorBody {
    /// Joins the message descriptions into a single line.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .error
            .messages
            .iter()
            .map(|m| m.description.trim())
            .filter(|d| !d.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }

    /// Summarise a raw response body, falling back to the text itself.
    #[must_use]
    pub fn describe(text: &str) -> String {
        serde_json::from_str::<Self>(text)
            .ok()
            .and_then(|body| body.summary())
            .unwrap_or_else(|| text.trim().to_string())
    }
}

impl Error {
    /// Map a non-success HTTP status and its body to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let text = FmcErrorBody::describe(body);
        match status {
            StatusCode::BAD_REQUEST => Self::BadRequest(text),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(text),
            StatusCode::FORBIDDEN => Self::Forbidden(text),
            StatusCode::NOT_FOUND => Self::NotFound(text),
            StatusCode::CONFLICT => Self::Conflict(text),
            StatusCode::UNPROCESSABLE_ENTITY => Self::ValidationError(text),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(text),
            status if status.is_server_error() => {
                Self::ServiceUnavailable(format!("FMC server error {status}: {text}"))
            }
            _ => Self::HttpError(format!("FMC error {status}: {text}")),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::InvalidId(_) => "INVALID_ID",
            Self::InvalidAddress(_) => "INVALID_ADDRESS",
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::Unsupported(_) => "UNSUPPORTED",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if repeating the request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited(_) | Self::ServiceUnavailable(_) | Self::Timeout(_)
        )
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::InternalError(_) | Self::ConfigError(_) | Self::AuthenticationFailed(_)
        )
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Self::InvalidId(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::RateLimited("test".to_string()).error_code(),
            "RATE_LIMITED"
        );
        assert_eq!(
            Error::Unauthorized("test".to_string()).error_code(),
            "UNAUTHORIZED"
        );
        assert_eq!(
            Error::AuthenticationFailed("test".to_string()).error_code(),
            "AUTHENTICATION_FAILED"
        );
        assert_eq!(
            Error::InvalidAddress("test".to_string()).error_code(),
            "INVALID_ADDRESS"
        );
        assert_eq!(
            Error::Unsupported("test".to_string()).error_code(),
            "UNSUPPORTED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::NotFound("object/hosts/abc".to_string());
        assert_eq!(err.to_string(), "Not found: object/hosts/abc");

        let err = Error::RateLimited("gave up after 5 retries".to_string());
        assert_eq!(err.to_string(), "Rate limited: gave up after 5 retries");
    }

    #[test]
    fn test_fmc_error_body_summary() {
        let body = r#"{"error":{"category":"FRAMEWORK","severity":"ERROR",
            "messages":[{"description":"Duplicate Name"},{"description":"Second issue"}]}}"#;
        assert_eq!(FmcErrorBody::describe(body), "Duplicate Name; Second issue");
    }

    #[test]
    fn test_fmc_error_body_falls_back_to_text() {
        assert_eq!(FmcErrorBody::describe("  plain failure \n"), "plain failure");
        assert_eq!(FmcErrorBody::describe(r#"{"error":{"messages":[]}}"#), r#"{"error":{"messages":[]}}"#);
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(
            Error::from_status(StatusCode::BAD_REQUEST, "x"),
            Error::BadRequest(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::UNAUTHORIZED, "x"),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::FORBIDDEN, "x"),
            Error::Forbidden(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::NOT_FOUND, "x"),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::CONFLICT, "x"),
            Error::Conflict(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, "x"),
            Error::ValidationError(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::TOO_MANY_REQUESTS, "x"),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::BAD_GATEWAY, "x"),
            Error::ServiceUnavailable(_)
        ));
        assert!(matches!(
            Error::from_status(StatusCode::IM_A_TEAPOT, "x"),
            Error::HttpError(_)
        ));
    }

    #[test]
    fn test_from_status_uses_fmc_description() {
        let body = r#"{"error":{"messages":[{"description":"Invalid IP Address"}]}}"#;
        let err = Error::from_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(err, Error::BadRequest("Invalid IP Address".to_string()));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited("x".into()).is_retryable());
        assert!(Error::Timeout("x".into()).is_retryable());
        assert!(!Error::NotFound("x".into()).is_retryable());
        assert!(!Error::ValidationError("x".into()).is_retryable());
    }

    #[test]
    fn test_should_log() {
        assert!(Error::InternalError("test".to_string()).should_log());
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::AuthenticationFailed("test".to_string()).should_log());

        assert!(!Error::NotFound("test".to_string()).should_log());
        assert!(!Error::InvalidRequest("test".to_string()).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let fmc_err: Error = err.into();
        assert!(matches!(fmc_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_uuid_error() {
        let err = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();
        let fmc_err: Error = err.into();
        assert!(matches!(fmc_err, Error::InvalidId(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let fmc_err: Error = err.into();
        assert!(matches!(fmc_err, Error::ParseError(_)));
    }
}
