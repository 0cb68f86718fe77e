//! Error types for the Refractor console

use std::collections::HashMap;
use thiserror::Error;

/// Field name -> message, as returned by the backend on validation failure
pub type FieldErrors = HashMap<String, String>;

/// Failure of a single REST call against the Refractor backend
///
/// Stores map these into toasts and sentinels; only `Validation` travels
/// further up to the caller so a form can show field-level messages.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Request never produced a response (DNS, connect, TLS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend rejected the input with structured field errors
    #[error("Validation failed: {message}")]
    Validation { message: String, errors: FieldErrors },

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or insufficient credentials
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Request was superseded by a newer one for the same resource
    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Message the backend attached to the failure, if any
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Validation { message, .. } if !message.is_empty() => Some(message),
            ApiError::NotFound(message) | ApiError::Unauthorized(message) if !message.is_empty() => {
                Some(message)
            }
            ApiError::Server { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }

    /// Field errors for validation failures
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for REST operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors raised while assembling the application context
#[derive(Error, Debug)]
pub enum RefractorError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("permission error: {0}")]
    Permission(#[from] crate::permissions::PermissionError),

    #[error("http client error: {0}")]
    Http(String),
}

/// Result type for context setup
pub type Result<T> = std::result::Result<T, RefractorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_transport() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_error_display_server() {
        let err = ApiError::Server {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Server error (500): boom");
    }

    #[test]
    fn test_backend_message_skips_empty() {
        let err = ApiError::Server {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.backend_message(), None);

        let err = ApiError::NotFound("player not found".to_string());
        assert_eq!(err.backend_message(), Some("player not found"));
    }

    #[test]
    fn test_field_errors_only_on_validation() {
        let mut errors = FieldErrors::new();
        errors.insert("reason".to_string(), "required".to_string());
        let err = ApiError::Validation {
            message: "invalid input".to_string(),
            errors: errors.clone(),
        };

        assert!(err.is_validation());
        assert_eq!(err.field_errors(), Some(&errors));
        assert_eq!(ApiError::Cancelled.field_errors(), None);
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("not valid json").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
