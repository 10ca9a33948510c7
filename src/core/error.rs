//! Typed error handling for request filtering
//!
//! Every error here is a configuration or programmer error except
//! [`RequestError`], which covers malformed request bodies reaching the
//! extractor. None of them are caught inside the engine: a failure aborts
//! the whole sanitize pass, and therefore the whole accessor call.
//!
//! # Error Categories
//!
//! - [`FilterError`]: a filter identifier could not be resolved or applied
//! - [`ConfigError`]: loading filter configuration failed
//! - [`RequestError`]: the incoming request could not be read into an input map
//!
//! # Example
//!
//! ```rust,ignore
//! match request.input(Some("email"), None) {
//!     Ok(email) => println!("email: {}", email),
//!     Err(SanitizeError::Filter(FilterError::Unknown { identifier })) => {
//!         eprintln!("no filter registered as {}", identifier);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for the sanitization layer
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The filter specification is not a mapping, or one of its entries is malformed
    #[error("{message}")]
    InvalidArgument { message: String },

    /// A filter could not be resolved or failed while running
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Filter configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request could not be turned into an input map
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SanitizeError {
    /// Shorthand for the "spec is not a mapping" family of errors
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SanitizeError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SanitizeError::InvalidArgument { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            SanitizeError::Filter(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SanitizeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SanitizeError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SanitizeError::InvalidArgument { .. } => "INVALID_FILTER_CONFIG",
            SanitizeError::Filter(e) => e.error_code(),
            SanitizeError::Config(_) => "CONFIG_ERROR",
            SanitizeError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SanitizeError::Filter(
                FilterError::Unknown { identifier }
                | FilterError::InvalidOptions { identifier, .. }
                | FilterError::Failed { identifier, .. },
            ) => Some(serde_json::json!({ "filter": identifier })),
            _ => None,
        }
    }
}

impl IntoResponse for SanitizeError {
    fn into_response(self) -> Response {
        if self.status_code().is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request filtering failed");
        }
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors raised while resolving or running a named filter
#[derive(Debug, Error)]
pub enum FilterError {
    /// No filter is registered under this identifier
    #[error("filter '{identifier}' is not registered as a Filterable")]
    Unknown { identifier: String },

    /// The filter exists but could not be built from the given options
    #[error("filter '{identifier}' rejected its options: {message}")]
    InvalidOptions { identifier: String, message: String },

    /// The filter was built but failed on a value
    #[error("filter '{identifier}' failed: {message}")]
    Failed { identifier: String, message: String },
}

impl FilterError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FilterError::Unknown { .. } => "UNKNOWN_FILTER",
            FilterError::InvalidOptions { .. } => "INVALID_FILTER_OPTIONS",
            FilterError::Failed { .. } => "FILTER_FAILED",
        }
    }

    /// The identifier of the offending filter
    pub fn identifier(&self) -> &str {
        match self {
            FilterError::Unknown { identifier }
            | FilterError::InvalidOptions { identifier, .. }
            | FilterError::Failed { identifier, .. } => identifier,
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to loading filter configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("{}", parse_message(.file, .message))]
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    IoError { message: String },
}

fn parse_message(file: &Option<String>, message: &str) -> String {
    match file {
        Some(file) => format!("Failed to parse config file '{}': {}", file, message),
        None => format!("Failed to parse config: {}", message),
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to reading the incoming request
#[derive(Debug, Error)]
pub enum RequestError {
    /// The request body could not be read or decoded
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// The query string could not be decoded
    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
        }
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_yaml::Error> for SanitizeError {
    fn from(err: serde_yaml::Error) -> Self {
        SanitizeError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for SanitizeError {
    fn from(err: serde_json::Error) -> Self {
        SanitizeError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for SanitizeError {
    fn from(err: std::io::Error) -> Self {
        SanitizeError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for sanitization
pub type SanitizeResult<T> = Result<T, SanitizeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_filter_display() {
        let err = FilterError::Unknown {
            identifier: "DoesNotExist".to_string(),
        };
        assert!(err.to_string().contains("DoesNotExist"));
        assert_eq!(err.error_code(), "UNKNOWN_FILTER");
    }

    #[test]
    fn test_filter_error_is_server_error() {
        let err: SanitizeError = FilterError::Failed {
            identifier: "ToInt".to_string(),
            message: "boom".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "FILTER_FAILED");
    }

    #[test]
    fn test_request_error_is_bad_request() {
        let err: SanitizeError = RequestError::InvalidBody {
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_BODY");
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = SanitizeError::invalid_argument("filters only accepts array/mapping as its value");
        assert_eq!(
            err.to_string(),
            "filters only accepts array/mapping as its value"
        );
        assert_eq!(err.error_code(), "INVALID_FILTER_CONFIG");
    }

    #[test]
    fn test_response_details_carry_filter_name() {
        let err: SanitizeError = FilterError::Unknown {
            identifier: "Nope".to_string(),
        }
        .into();
        let response = err.to_response();
        assert_eq!(response.code, "UNKNOWN_FILTER");
        assert_eq!(
            response.details,
            Some(serde_json::json!({ "filter": "Nope" }))
        );
    }

    #[test]
    fn test_config_parse_error_mentions_file() {
        let err = ConfigError::ParseError {
            file: Some("filters.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("filters.yaml"));

        let err = ConfigError::ParseError {
            file: None,
            message: "bad indent".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to parse config: bad indent");
    }
}
