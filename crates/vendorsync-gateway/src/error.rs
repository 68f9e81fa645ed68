/*
[INPUT]:  Error sources (HTTP, API, serialization, configuration)
[OUTPUT]: Structured error types for the bridge gateway
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the bridge gateway
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bridge returned a non-success status
    #[error("bridge error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// True when the failure happened at the HTTP layer (connection,
    /// timeout, or a non-success status) rather than in local handling.
    ///
    /// The runner treats every gateway error as terminal for a run; this
    /// distinction exists for logging only.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Http(_) | GatewayError::Api { .. })
    }

    /// Create an API error from a status code and response body
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        GatewayError::Api {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = GatewayError::api_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            _ => panic!("Expected Api error variant"),
        }
    }

    #[test]
    fn test_is_transport() {
        let api = GatewayError::api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(api.is_transport());

        let config = GatewayError::Config("missing base url".to_string());
        assert!(!config.is_transport());
    }
}
